/*!

This is the long-form manual for `condorcet_irv` and `bgrank`.

## Ranking methods

### `condorcetIrv`

Ranks all the candidates, one position at a time. Every voter is treated as a ballot that
ranks the candidates they rated, from their highest rating to their lowest. Two candidates are
compared head-to-head among the voters who rated both of them. Equal ratings do not count.

For each rank, the candidate who beats every other remaining candidate takes the position. When
the preferences form a cycle (A beats B, B beats C, C beats A), the weakest candidate is set aside
and the search is repeated on the others, until one candidate is undefeated. The weakest
candidate is the one with, in this order:
1. the fewest voters rating it highest (ties for a voter's highest rating all count),
2. the fewest ratings,
3. the oldest publication year,
4. the smallest catalog id.

The candidates set aside are only excluded for the current position: they compete again for the
next one. The `Tiebreak` column of the output gives the number of candidates set aside before a
position was decided.

### `commonRaterAverage`

The average rating of each candidate, among the voters who rated all the candidates. This is a
like-for-like comparison but it ignores every voter who skipped a candidate, which quickly
becomes most of them as more candidates are compared. It fails if no voter rated every
candidate.

## Rating files

Ratings are read from a directory holding one file per candidate, named after the candidate id.
When the configuration lists no candidate, every file named by a catalog id is ranked. The id
is written without leading zeros: `13.csv` is a game, `013.csv` and `2024-notes.csv` are ignored.

### `csv`

One rating per line, without header:

```text
alice,8.5
bob,7
carol,N/A
```

Lines rated `N/A` (comments without a rating) are skipped.

### `json`

One object per file, mapping the voter to the rating. Ratings may be numbers or strings:

```text
{"alice": 8.5, "bob": "7"}
```

## Configuration

`bgrank` reads a configuration in JSON:

```text
{
  "outputSettings": { "rankingName": "Heavy games", "outputDirectory": "out" },
  "ratingSource": { "provider": "csv", "directory": "ratings" },
  "candidates": [
    { "id": "174430", "name": "Gloomhaven", "yearPublished": 2017 },
    { "id": "161936", "name": "Pandemic Legacy: Season 1", "yearPublished": 2015,
      "excluded": true }
  ],
  "rules": { "method": "condorcetIrv", "maxCandidates": 100 }
}
```

- `catalogId` (number, optional): the id used in the last step of the tiebreak. Defaults to the
  candidate id, which must then be a number.
- `excluded` (boolean, optional): the candidate is not ranked and its ratings are not read.
- `maxCandidates` (number, optional): only the first candidates of the list are ranked.
- if `candidates` is empty, all the rating files of the directory are ranked.

Paths are relative to the configuration file. The command line options `--input`,
`--input-type`, `--method` and `--limit` override the configuration.

## Output

The result is printed as a table. A JSON summary is written to
`<outputDirectory>/<rankingName>_summary.json` when an output directory is configured, or to the
path given with `--out` (`stdout` prints it, a path ending with `.csv` receives the table
instead). With `--reference`, the summary is compared to an expected summary and any difference
is reported as an error.

 */
