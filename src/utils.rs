use crate::engine::{Rgb, Tile, TileState};
use crate::error::PuzzleError;

/// Parses an array of string slices into a `TileState`.
///
/// Each string slice is one row of the grid, starting from row 0. A row is a
/// whitespace-separated list of tiles written as `id:#rrggbb@alpha`, for example
/// `3:#ff8800@0.25`. Blank lines and comment lines (`# ` followed by text) are skipped.
///
/// # Arguments
/// * `s`: the lines of the grid, top row first.
///
/// # Returns
/// * `Ok(TileState)` if every token parses and the tiles form a valid grid.
/// * `Err(PuzzleError::InvalidGridSize)` if the rows do not form a square of side 2 or
///   more.
/// * `Err(PuzzleError::MalformedTile)` if a token cannot be parsed, or the tiles fail
///   the checks of `TileState::new`. `index` is the row-major cell of the bad tile.
///
/// # Examples
/// ```
/// use hue_puzzle_solver::utils::state_from_str_array;
///
/// let grid = [
///     "# a solved 2x2 grid",
///     "0:#102030@0.333 1:#102030@0.667",
///     "2:#ff0000@0.333 3:#ff0000@0.667",
/// ];
/// let state = state_from_str_array(&grid).unwrap();
/// assert_eq!(state.grid_size(), 2);
/// assert_eq!(state.get_tile(1, 0).color.r, 0xff);
///
/// assert!(state_from_str_array(&["0:#102030@0.5 1:red@0.5"]).is_err());
/// ```
pub fn state_from_str_array(s: &[&str]) -> Result<TileState, PuzzleError> {
    let rows: Vec<Vec<&str>> = s
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty() && !is_comment(line))
        .map(|line| line.split_whitespace().collect())
        .collect();

    let len = rows.iter().map(Vec::len).sum();
    if rows.iter().any(|row| row.len() != rows.len()) {
        return Err(PuzzleError::InvalidGridSize { len });
    }

    let tiles = rows
        .iter()
        .flatten()
        .enumerate()
        .map(|(index, token)| parse_tile(index, token))
        .collect::<Result<Vec<Tile>, PuzzleError>>()?;

    TileState::new(tiles)
}

/// Writes `state` in the format read by `state_from_str_array`, one line per row.
///
/// Alphas are printed in full, so reading the lines back gives an identical state.
pub fn state_to_lines(state: &TileState) -> Vec<String> {
    state
        .rows()
        .map(|row| {
            row.iter()
                .map(|tile| {
                    let Rgb { r, g, b } = tile.color;
                    format!("{}:#{:02x}{:02x}{:02x}@{}", tile.id, r, g, b, tile.alpha)
                })
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

fn is_comment(line: &str) -> bool {
    line == "#" || line.starts_with("# ")
}

fn parse_tile(index: usize, token: &str) -> Result<Tile, PuzzleError> {
    let (id, rest) = token
        .split_once(':')
        .ok_or_else(|| PuzzleError::malformed(index, format!("'{}' has no id", token)))?;
    let (color, alpha) = rest
        .split_once('@')
        .ok_or_else(|| PuzzleError::malformed(index, format!("'{}' has no alpha", token)))?;

    let id = id
        .parse::<usize>()
        .map_err(|e| PuzzleError::malformed(index, format!("id '{}': {}", id, e)))?;
    let color = parse_color(color)
        .ok_or_else(|| PuzzleError::malformed(index, format!("color '{}' is not #rrggbb", color)))?;
    let alpha = alpha
        .parse::<f64>()
        .map_err(|e| PuzzleError::malformed(index, format!("alpha '{}': {}", alpha, e)))?;

    Ok(Tile::new(id, color, alpha))
}

fn parse_color(s: &str) -> Option<Rgb> {
    let hex = s.strip_prefix('#')?;
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Rgb::new(channel(0)?, channel(2)?, channel(4)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SORTED_3X3: [&str; 3] = [
        "0:#0a0a0a@0.25 1:#0a0a0a@0.5 2:#0a0a0a@0.75",
        "3:#00ff00@0.25 4:#00ff00@0.5 5:#00ff00@0.75",
        "6:#ff0000@0.25 7:#ff0000@0.5 8:#ff0000@0.75",
    ];

    #[test]
    fn test_state_from_str_array_valid() {
        let state = state_from_str_array(&SORTED_3X3).unwrap();
        assert_eq!(state.grid_size(), 3);
        assert_eq!(state.get_tile(0, 0).color, Rgb::new(10, 10, 10));
        assert_eq!(state.get_tile(1, 2).id, 5);
        assert_eq!(state.get_tile(2, 1).alpha, 0.5);
    }

    #[test]
    fn test_state_from_str_array_skips_blank_and_comment_lines() {
        let mut lines = vec!["# generated grid", "", "   "];
        lines.extend(SORTED_3X3);
        lines.push("#");
        let state = state_from_str_array(&lines).unwrap();
        assert_eq!(state, state_from_str_array(&SORTED_3X3).unwrap());
    }

    #[test]
    fn test_state_from_str_array_not_square() {
        let result = state_from_str_array(&SORTED_3X3[..2]);
        assert_eq!(result, Err(PuzzleError::InvalidGridSize { len: 6 }));

        let ragged = [SORTED_3X3[0], "3:#00ff00@0.25 4:#00ff00@0.5", SORTED_3X3[2]];
        assert_eq!(
            state_from_str_array(&ragged),
            Err(PuzzleError::InvalidGridSize { len: 8 })
        );
    }

    #[test]
    fn test_state_from_str_array_single_tile() {
        let result = state_from_str_array(&["0:#000000@0.5"]);
        assert_eq!(result, Err(PuzzleError::InvalidGridSize { len: 1 }));
    }

    #[test]
    fn test_state_from_str_array_bad_tokens() {
        let cases = [
            ("0#000000@0.5", "no id"),
            ("0:#000000", "no alpha"),
            ("x:#000000@0.5", "id 'x'"),
            ("0:#00000@0.5", "not #rrggbb"),
            ("0:000000@0.5", "not #rrggbb"),
            ("0:#00zz00@0.5", "not #rrggbb"),
            ("0:#000000@half", "alpha 'half'"),
        ];
        for (token, expected) in cases {
            let lines = [
                format!("1:#000000@0.5 {}", token),
                "2:#000000@0.5 3:#000000@0.5".to_string(),
            ];
            let lines: Vec<&str> = lines.iter().map(String::as_str).collect();
            match state_from_str_array(&lines) {
                Err(PuzzleError::MalformedTile { index, reason }) => {
                    assert_eq!(index, 1, "token {}", token);
                    assert!(reason.contains(expected), "token {}: {}", token, reason);
                }
                other => panic!("token {}: unexpected {:?}", token, other),
            }
        }
    }

    #[test]
    fn test_state_from_str_array_rejects_invalid_tiles() {
        let duplicate = ["0:#000000@0.5 0:#000000@0.5", "2:#000000@0.5 3:#000000@0.5"];
        assert!(matches!(
            state_from_str_array(&duplicate),
            Err(PuzzleError::MalformedTile { index: 1, .. })
        ));

        let opaque = ["0:#000000@0.5 1:#000000@1", "2:#000000@0.5 3:#000000@0.5"];
        assert!(matches!(
            state_from_str_array(&opaque),
            Err(PuzzleError::MalformedTile { index: 1, .. })
        ));
    }

    #[test]
    fn test_state_to_lines_reads_back() {
        let state = TileState::random(4, 17).unwrap();
        let lines = state_to_lines(&state);
        assert_eq!(lines.len(), 4);
        let lines: Vec<&str> = lines.iter().map(String::as_str).collect();
        assert_eq!(state_from_str_array(&lines).unwrap(), state);
    }

    #[test]
    fn test_state_to_lines_format() {
        let state = state_from_str_array(&SORTED_3X3).unwrap();
        assert_eq!(state_to_lines(&state)[2], SORTED_3X3[2]);
    }
}
