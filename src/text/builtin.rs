//! The compiled-in fallback font: plain single-stroke capitals on a
//! y-down grid. Caps run from y 0 at the top to the baseline at y 14,
//! with descenders reaching y 16. Lowercase input renders as capitals.

use super::Glyph;

fn glyph(advance: f64, strokes: &[&[(f64, f64)]]) -> Glyph {
    Glyph {
        left: 0.0,
        right: advance,
        strokes: strokes.iter().map(|stroke| stroke.to_vec()).collect(),
    }
}

/// 96 glyph slots indexed by `char as usize - 32`.
pub(super) fn glyphs() -> Vec<Option<Glyph>> {
    let mut table: Vec<Option<Glyph>> = vec![None; 96];
    let mut set = |ch: char, g: Glyph| {
        table[ch as usize - 32] = Some(g);
    };

    set(' ', glyph(6.0, &[]));
    set(
        '!',
        glyph(4.0, &[&[(1.0, 0.0), (1.0, 9.0)], &[(1.0, 13.0), (1.0, 14.0)]]),
    );
    set(
        '"',
        glyph(6.0, &[&[(1.0, 0.0), (1.0, 4.0)], &[(4.0, 0.0), (4.0, 4.0)]]),
    );
    set('\'', glyph(4.0, &[&[(1.0, 0.0), (1.0, 4.0)]]));
    set(
        '(',
        glyph(
            6.0,
            &[&[(3.0, 0.0), (1.0, 3.0), (0.0, 6.0), (0.0, 8.0), (1.0, 11.0), (3.0, 14.0)]],
        ),
    );
    set(
        ')',
        glyph(
            6.0,
            &[&[(0.0, 0.0), (2.0, 3.0), (3.0, 6.0), (3.0, 8.0), (2.0, 11.0), (0.0, 14.0)]],
        ),
    );
    set(
        '+',
        glyph(8.0, &[&[(3.0, 5.0), (3.0, 11.0)], &[(0.0, 8.0), (6.0, 8.0)]]),
    );
    set(',', glyph(4.0, &[&[(1.0, 13.0), (0.0, 16.0)]]));
    set('-', glyph(8.0, &[&[(0.0, 8.0), (6.0, 8.0)]]));
    set('.', glyph(4.0, &[&[(1.0, 13.0), (1.0, 14.0)]]));
    set('/', glyph(8.0, &[&[(0.0, 14.0), (6.0, 0.0)]]));
    set(
        ':',
        glyph(4.0, &[&[(1.0, 5.0), (1.0, 6.0)], &[(1.0, 13.0), (1.0, 14.0)]]),
    );
    set(
        ';',
        glyph(4.0, &[&[(1.0, 5.0), (1.0, 6.0)], &[(1.0, 13.0), (0.0, 16.0)]]),
    );
    set(
        '=',
        glyph(8.0, &[&[(0.0, 6.0), (6.0, 6.0)], &[(0.0, 10.0), (6.0, 10.0)]]),
    );
    set(
        '?',
        glyph(
            9.0,
            &[
                &[
                    (0.0, 2.0),
                    (2.0, 0.0),
                    (5.0, 0.0),
                    (7.0, 2.0),
                    (7.0, 5.0),
                    (3.5, 8.0),
                    (3.5, 10.0),
                ],
                &[(3.5, 13.0), (3.5, 14.0)],
            ],
        ),
    );
    set('_', glyph(10.0, &[&[(0.0, 16.0), (8.0, 16.0)]]));

    set(
        '0',
        glyph(
            10.0,
            &[
                &[
                    (2.0, 0.0),
                    (6.0, 0.0),
                    (8.0, 2.0),
                    (8.0, 12.0),
                    (6.0, 14.0),
                    (2.0, 14.0),
                    (0.0, 12.0),
                    (0.0, 2.0),
                    (2.0, 0.0),
                ],
                &[(1.0, 11.0), (7.0, 3.0)],
            ],
        ),
    );
    set(
        '1',
        glyph(
            10.0,
            &[&[(2.0, 3.0), (4.0, 0.0), (4.0, 14.0)], &[(1.0, 14.0), (7.0, 14.0)]],
        ),
    );
    set(
        '2',
        glyph(
            10.0,
            &[&[
                (0.0, 3.0),
                (1.0, 1.0),
                (3.0, 0.0),
                (6.0, 0.0),
                (8.0, 2.0),
                (8.0, 5.0),
                (0.0, 14.0),
                (8.0, 14.0),
            ]],
        ),
    );
    set(
        '3',
        glyph(
            10.0,
            &[
                &[
                    (0.0, 1.0),
                    (2.0, 0.0),
                    (6.0, 0.0),
                    (8.0, 2.0),
                    (8.0, 5.0),
                    (6.0, 7.0),
                    (3.0, 7.0),
                ],
                &[(6.0, 7.0), (8.0, 9.0), (8.0, 12.0), (6.0, 14.0), (2.0, 14.0), (0.0, 13.0)],
            ],
        ),
    );
    set(
        '4',
        glyph(10.0, &[&[(6.0, 14.0), (6.0, 0.0), (0.0, 10.0), (8.0, 10.0)]]),
    );
    set(
        '5',
        glyph(
            10.0,
            &[&[
                (8.0, 0.0),
                (0.0, 0.0),
                (0.0, 6.0),
                (5.0, 6.0),
                (8.0, 8.0),
                (8.0, 12.0),
                (6.0, 14.0),
                (2.0, 14.0),
                (0.0, 12.0),
            ]],
        ),
    );
    set(
        '6',
        glyph(
            10.0,
            &[&[
                (8.0, 1.0),
                (6.0, 0.0),
                (3.0, 0.0),
                (0.0, 3.0),
                (0.0, 12.0),
                (2.0, 14.0),
                (6.0, 14.0),
                (8.0, 12.0),
                (8.0, 9.0),
                (6.0, 7.0),
                (0.0, 7.0),
            ]],
        ),
    );
    set('7', glyph(10.0, &[&[(0.0, 0.0), (8.0, 0.0), (3.0, 14.0)]]));
    set(
        '8',
        glyph(
            10.0,
            &[
                &[
                    (2.0, 0.0),
                    (6.0, 0.0),
                    (8.0, 2.0),
                    (8.0, 5.0),
                    (6.0, 7.0),
                    (2.0, 7.0),
                    (0.0, 9.0),
                    (0.0, 12.0),
                    (2.0, 14.0),
                    (6.0, 14.0),
                    (8.0, 12.0),
                    (8.0, 9.0),
                    (6.0, 7.0),
                ],
                &[(2.0, 7.0), (0.0, 5.0), (0.0, 2.0), (2.0, 0.0)],
            ],
        ),
    );
    set(
        '9',
        glyph(
            10.0,
            &[&[
                (0.0, 13.0),
                (2.0, 14.0),
                (5.0, 14.0),
                (8.0, 11.0),
                (8.0, 2.0),
                (6.0, 0.0),
                (2.0, 0.0),
                (0.0, 2.0),
                (0.0, 5.0),
                (2.0, 7.0),
                (8.0, 7.0),
            ]],
        ),
    );

    set(
        'A',
        glyph(
            10.0,
            &[&[(0.0, 14.0), (4.0, 0.0), (8.0, 14.0)], &[(1.5, 9.0), (6.5, 9.0)]],
        ),
    );
    set(
        'B',
        glyph(
            9.0,
            &[
                &[(0.0, 0.0), (0.0, 14.0)],
                &[(0.0, 0.0), (6.0, 0.0), (7.0, 1.0), (7.0, 6.0), (6.0, 7.0), (0.0, 7.0)],
                &[(6.0, 7.0), (7.0, 8.0), (7.0, 13.0), (6.0, 14.0), (0.0, 14.0)],
            ],
        ),
    );
    set(
        'C',
        glyph(
            10.0,
            &[&[
                (8.0, 2.0),
                (6.0, 0.0),
                (2.0, 0.0),
                (0.0, 2.0),
                (0.0, 12.0),
                (2.0, 14.0),
                (6.0, 14.0),
                (8.0, 12.0),
            ]],
        ),
    );
    set(
        'D',
        glyph(
            10.0,
            &[
                &[(0.0, 0.0), (0.0, 14.0)],
                &[(0.0, 0.0), (5.0, 0.0), (8.0, 3.0), (8.0, 11.0), (5.0, 14.0), (0.0, 14.0)],
            ],
        ),
    );
    set(
        'E',
        glyph(
            10.0,
            &[&[(8.0, 0.0), (0.0, 0.0), (0.0, 14.0), (8.0, 14.0)], &[(0.0, 7.0), (6.0, 7.0)]],
        ),
    );
    set(
        'F',
        glyph(
            10.0,
            &[&[(8.0, 0.0), (0.0, 0.0), (0.0, 14.0)], &[(0.0, 7.0), (6.0, 7.0)]],
        ),
    );
    set(
        'G',
        glyph(
            10.0,
            &[&[
                (8.0, 2.0),
                (6.0, 0.0),
                (2.0, 0.0),
                (0.0, 2.0),
                (0.0, 12.0),
                (2.0, 14.0),
                (6.0, 14.0),
                (8.0, 12.0),
                (8.0, 8.0),
                (5.0, 8.0),
            ]],
        ),
    );
    set(
        'H',
        glyph(
            10.0,
            &[
                &[(0.0, 0.0), (0.0, 14.0)],
                &[(8.0, 0.0), (8.0, 14.0)],
                &[(0.0, 7.0), (8.0, 7.0)],
            ],
        ),
    );
    set(
        'I',
        glyph(
            8.0,
            &[
                &[(0.0, 0.0), (6.0, 0.0)],
                &[(3.0, 0.0), (3.0, 14.0)],
                &[(0.0, 14.0), (6.0, 14.0)],
            ],
        ),
    );
    set(
        'J',
        glyph(
            8.0,
            &[&[(6.0, 0.0), (6.0, 12.0), (4.0, 14.0), (2.0, 14.0), (0.0, 12.0)]],
        ),
    );
    set(
        'K',
        glyph(
            10.0,
            &[
                &[(0.0, 0.0), (0.0, 14.0)],
                &[(8.0, 0.0), (0.0, 7.5)],
                &[(3.0, 5.0), (8.0, 14.0)],
            ],
        ),
    );
    set('L', glyph(9.0, &[&[(0.0, 0.0), (0.0, 14.0), (7.0, 14.0)]]));
    set(
        'M',
        glyph(
            10.0,
            &[&[(0.0, 14.0), (0.0, 0.0), (4.0, 8.0), (8.0, 0.0), (8.0, 14.0)]],
        ),
    );
    set(
        'N',
        glyph(10.0, &[&[(0.0, 14.0), (0.0, 0.0), (8.0, 14.0), (8.0, 0.0)]]),
    );
    set(
        'O',
        glyph(
            10.0,
            &[&[
                (2.0, 0.0),
                (6.0, 0.0),
                (8.0, 2.0),
                (8.0, 12.0),
                (6.0, 14.0),
                (2.0, 14.0),
                (0.0, 12.0),
                (0.0, 2.0),
                (2.0, 0.0),
            ]],
        ),
    );
    set(
        'P',
        glyph(
            10.0,
            &[&[
                (0.0, 14.0),
                (0.0, 0.0),
                (6.0, 0.0),
                (8.0, 2.0),
                (8.0, 6.0),
                (6.0, 8.0),
                (0.0, 8.0),
            ]],
        ),
    );
    set(
        'Q',
        glyph(
            10.0,
            &[
                &[
                    (2.0, 0.0),
                    (6.0, 0.0),
                    (8.0, 2.0),
                    (8.0, 12.0),
                    (6.0, 14.0),
                    (2.0, 14.0),
                    (0.0, 12.0),
                    (0.0, 2.0),
                    (2.0, 0.0),
                ],
                &[(5.0, 10.0), (8.0, 14.0)],
            ],
        ),
    );
    set(
        'R',
        glyph(
            10.0,
            &[
                &[
                    (0.0, 14.0),
                    (0.0, 0.0),
                    (6.0, 0.0),
                    (8.0, 2.0),
                    (8.0, 6.0),
                    (6.0, 8.0),
                    (0.0, 8.0),
                ],
                &[(4.0, 8.0), (8.0, 14.0)],
            ],
        ),
    );
    set(
        'S',
        glyph(
            10.0,
            &[&[
                (8.0, 2.0),
                (6.0, 0.0),
                (2.0, 0.0),
                (0.0, 2.0),
                (0.0, 5.0),
                (2.0, 7.0),
                (6.0, 7.0),
                (8.0, 9.0),
                (8.0, 12.0),
                (6.0, 14.0),
                (2.0, 14.0),
                (0.0, 12.0),
            ]],
        ),
    );
    set(
        'T',
        glyph(10.0, &[&[(0.0, 0.0), (8.0, 0.0)], &[(4.0, 0.0), (4.0, 14.0)]]),
    );
    set(
        'U',
        glyph(
            10.0,
            &[&[(0.0, 0.0), (0.0, 12.0), (2.0, 14.0), (6.0, 14.0), (8.0, 12.0), (8.0, 0.0)]],
        ),
    );
    set('V', glyph(10.0, &[&[(0.0, 0.0), (4.0, 14.0), (8.0, 0.0)]]));
    set(
        'W',
        glyph(
            10.0,
            &[&[(0.0, 0.0), (2.0, 14.0), (4.0, 6.0), (6.0, 14.0), (8.0, 0.0)]],
        ),
    );
    set(
        'X',
        glyph(10.0, &[&[(0.0, 0.0), (8.0, 14.0)], &[(8.0, 0.0), (0.0, 14.0)]]),
    );
    set(
        'Y',
        glyph(
            10.0,
            &[&[(0.0, 0.0), (4.0, 7.0), (8.0, 0.0)], &[(4.0, 7.0), (4.0, 14.0)]],
        ),
    );
    set(
        'Z',
        glyph(10.0, &[&[(0.0, 0.0), (8.0, 0.0), (0.0, 14.0), (8.0, 14.0)]]),
    );

    // Lowercase renders as capitals until someone draws small glyphs.
    for ch in 'a'..='z' {
        let upper = table[ch.to_ascii_uppercase() as usize - 32].clone();
        table[ch as usize - 32] = upper;
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_letters_and_digits_present() {
        let table = glyphs();
        for ch in ('A'..='Z').chain('a'..='z').chain('0'..='9') {
            assert!(table[ch as usize - 32].is_some(), "missing glyph for {:?}", ch);
        }
    }

    #[test]
    fn test_strokes_stay_in_glyph_box() {
        let table = glyphs();
        for (i, slot) in table.iter().enumerate() {
            let Some(g) = slot else { continue };
            for stroke in &g.strokes {
                for (x, y) in stroke {
                    assert!(*x >= g.left && *x <= g.right, "glyph {} x out of box", i + 32);
                    assert!(*y >= -2.0 && *y <= 18.0, "glyph {} y out of box", i + 32);
                }
            }
        }
    }

    #[test]
    fn test_lowercase_maps_to_capitals() {
        let table = glyphs();
        assert_eq!(table['a' as usize - 32], table['A' as usize - 32]);
    }
}
