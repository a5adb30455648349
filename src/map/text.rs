//! # Text grid maps
//!
//! * One line per map row, one character per cell.
//! * `' '` = empty, `'#'` = flat grey wall, `'0'..='9'` = textured wall
//!   using atlas tile of that digit.
//! * Lines with at most one character are noise (blank separators,
//!   trailing newlines) and are skipped.
//!
//! Width comes from the first row, height from the row count. Every row
//! must be as wide as the first and the outer ring must be solid, so a
//! ray can never march off the map.

use thiserror::Error;

use crate::world::{Cell, WALL_GREY};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum MapError {
    #[error("map holds no rows")]
    Empty,

    #[error("row {row} is {found} cells wide, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("row {row}, column {col}: unknown cell character {ch:?}")]
    UnknownCell { row: usize, col: usize, ch: char },

    #[error("border cell ({x}, {y}) is not a wall; the map is not enclosed")]
    Unenclosed { x: usize, y: usize },
}

/// Character → cell. `None` for characters the format does not define.
pub fn cell_from_char(ch: char) -> Option<Cell> {
    match ch {
        ' ' => Some(Cell::Empty),
        '#' => Some(Cell::Wall(WALL_GREY)),
        _ => ch.to_digit(10).map(|d| Cell::Textured(d as u16)),
    }
}

/// Parse map text into validated rows of cells.
pub fn parse_map(text: &str) -> Result<Vec<Vec<Cell>>, MapError> {
    let mut rows: Vec<Vec<Cell>> = Vec::new();

    // `lines` strips "\n" and "\r\n"; spaces are cells and stay
    for line in text.lines().filter(|l| l.chars().count() > 1) {
        let row_idx = rows.len();
        let row = line
            .chars()
            .enumerate()
            .map(|(col, ch)| {
                cell_from_char(ch).ok_or(MapError::UnknownCell {
                    row: row_idx,
                    col,
                    ch,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(first) = rows.first() {
            if row.len() != first.len() {
                return Err(MapError::Ragged {
                    row: row_idx,
                    expected: first.len(),
                    found: row.len(),
                });
            }
        }
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(MapError::Empty);
    }
    check_enclosed(&rows)?;
    Ok(rows)
}

fn check_enclosed(rows: &[Vec<Cell>]) -> Result<(), MapError> {
    let h = rows.len();
    let w = rows[0].len();
    for (y, row) in rows.iter().enumerate() {
        for (x, cell) in row.iter().enumerate() {
            let border = y == 0 || y == h - 1 || x == 0 || x == w - 1;
            if border && !cell.is_solid() {
                return Err(MapError::Unenclosed { x, y });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bordered_room() {
        let rows = parse_map("####\n#  #\n# 1#\n####\n").unwrap();
        assert_eq!(rows.len(), 4);
        assert!(rows.iter().all(|r| r.len() == 4));
        assert_eq!(rows[1][1], Cell::Empty);
        assert_eq!(rows[2][2], Cell::Textured(1));
        assert_eq!(rows[0][0], Cell::Wall(WALL_GREY));
    }

    #[test]
    fn short_lines_are_skipped() {
        let rows = parse_map("\n###\n# #\n\n###\n\n").unwrap();
        assert_eq!(rows.len(), 3);
        let rows = parse_map("###\r\n# #\r\n###\r\n").unwrap();
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn open_corner_is_rejected_not_truncated() {
        let err = parse_map("### \n#  #\n#  #\n####").unwrap_err();
        assert_eq!(err, MapError::Unenclosed { x: 3, y: 0 });
    }

    #[test]
    fn ragged_rows_rejected() {
        let err = parse_map("####\n#  #\n# #\n####").unwrap_err();
        assert_eq!(
            err,
            MapError::Ragged {
                row: 2,
                expected: 4,
                found: 3
            }
        );
    }

    #[test]
    fn empty_and_unknown() {
        assert_eq!(parse_map("").unwrap_err(), MapError::Empty);
        assert_eq!(parse_map("\n\n#\n").unwrap_err(), MapError::Empty);
        assert_eq!(
            parse_map("###\n#x#\n###").unwrap_err(),
            MapError::UnknownCell {
                row: 1,
                col: 1,
                ch: 'x'
            }
        );
    }

    #[test]
    fn digit_walls_close_the_border() {
        assert!(parse_map("012\n3 4\n567").is_ok());
    }
}
