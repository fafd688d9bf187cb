/*!

This is the long-form manual for `account_coverage` and `covmap`.

## Sheet types

Every sheet of the workbook is routed by its exact name:
* the reserved roster names (`CE` and `CSM` by default) are personnel rosters,
* the reserved quota names (`Quota` by default) are quota rosters,
* every other sheet is a brand sheet, named after the brand it describes.

### Brand sheets

The first row is the header. The following rows each describe one account:
column `B` holds the account name and column `C` the client type.

The other columns are organised in hierarchy groups. A group starts with a
column whose header contains `SLM`. It may be followed by a column whose header
contains `FLM`. All the following columns with a non-empty header, up to the
next `SLM` column, are role columns: the header is the name of the role and
the cells hold the names of the people deployed on the account.

| | Account | Client Type | Data SLM | Data FLM | Engineer | Architect |
|-|---------|-------------|----------|----------|----------|-----------|
| | Acme    | Enterprise  | Jane     | Bob      | Carol, Dave | TBD    |

A cell may hold several names, separated by commas or (when there is no
comma) by slashes. Placeholder values (`TBD`, `N/A`, `None`, `Select`, dashes)
are ignored.

A group is skipped for a row when both of its manager cells are empty. A row
is skipped when its account cell is empty. A sheet without any `SLM` column is
skipped.

The name of a group is the header just before its `SLM` column, or
`Group N` when that header is empty.

### Roster sheets

Flat tables with one person per row. Recognized headers:
* `Employee Name` (required)
* `Manager Tier` (or `Tier`, `SLM/FLM`, required): a cell containing `SLM` or
  `FLM` marks the person as a manager of that tier
* `Title/Specialty` (or `Title`, `Specialty`): becomes the role
* `Coverage` (or `Department`): comma separated accounts
* `Manager`, `Level`

Roster people have no account column. Managers get the accounts where they
appear with the same tier in the brand sheets. The others (or managers not
found in any brand sheet) get the accounts of their coverage list, and people
without any account are listed under `Unassigned`.

### Quota sheets

Flat tables with one quota line per row. Recognized headers:
`Seller Name` (required), `Manager Name`, `Manager Talent ID`,
`Target Quota Amt` (required), `Territory Type Name` (required), `Org Code`.

## Derived metrics

* **Allocation**: every person counts for `1 / n` on each of their `n`
  distinct accounts.
* **Account quota**: the largest `Target Quota Amt` among the lines of the
  account with the primary org code (`PRIMARY` by default). It is not the sum
  of the quotas of the people on the account.
* **Apportioned quota**: the sum of a person's quota lines, multiplied by
  their allocation.
* **Teams**: a person belongs to the client engineering team when one of their
  quota lines has the client engineering org code; otherwise the team follows
  the roster person type, then keywords in the role, then keywords in the first
  role recorded for that person, and finally the brand.

## Configuration

`covmap` accepts a JSON configuration file with the `--config` flag:

```json
{
  "input": "coverage.xlsx",
  "tier1Marker": "SLM",
  "tier2Marker": "FLM",
  "accountColumn": "B",
  "clientTypeColumn": 3,
  "rosterSheets": [{"sheetName": "CE", "personType": "CE"}],
  "quotaSheets": ["Quota"],
  "primaryOrgCode": "PRIMARY",
  "clientEngineeringOrgCode": "CE",
  "teamKeywords": [{"keyword": "architect", "team": "Technical Sales"}]
}
```

Column positions may be given as a 1-based number or as a spreadsheet column
letter. All the fields are optional.
*/
