mod common;

use common::fixed_measure;
use paperflow_pdf::{Error, Paragraph, TextRun, Token, break_lines, segment, tokenize};

fn lines_of(text: &str, width: f32) -> Vec<String> {
    break_lines(&[TextRun::normal(text)], width, fixed_measure)
        .expect("layout")
        .iter()
        .map(|l| l.text())
        .collect()
}

#[test]
fn tokenize_keeps_separators_and_style() {
    let tokens = tokenize(&[TextRun::normal("ab  cd "), TextRun::bold("ef")]);
    let expected = [
        ("ab", false),
        ("  ", false),
        ("cd", false),
        (" ", false),
        ("ef", true),
    ];
    let got: Vec<(&str, bool)> = tokens.iter().map(|t| (t.text.as_str(), t.bold)).collect();
    assert_eq!(got, expected);
    assert!(tokens[1].is_whitespace());
    assert!(!Token { text: "x".into(), bold: false }.is_whitespace());
}

#[test]
fn lines_never_exceed_width_unless_a_single_word_does() {
    for seed in 0..10 {
        let text = common::prose(seed, 120);
        let Paragraph::Runs(runs) = &segment(&text)[0] else {
            panic!("seed {seed} produced a blank paragraph");
        };
        for width in [40.0, 75.0, 120.0, 200.0, 333.0] {
            let lines = break_lines(runs, width, fixed_measure).expect("layout");
            assert!(!lines.is_empty());
            for line in &lines {
                let words = line.tokens.iter().filter(|t| !t.text.trim().is_empty()).count();
                if line.width > width {
                    assert_eq!(words, 1, "seed {seed} width {width}: {:?}", line.text());
                }
                let last = line.tokens.last().expect("non-empty line");
                assert!(!last.text.trim().is_empty(), "trailing whitespace");
            }
        }
    }
}

#[test]
fn token_filling_exact_remaining_width_stays_on_line() {
    // "aaaa bbbb" is 45pt wide
    assert_eq!(lines_of("aaaa bbbb cc", 45.0), ["aaaa bbbb", "cc"]);
    assert_eq!(lines_of("aaaa bbbb cc", 44.9), ["aaaa", "bbbb cc"]);
}

#[test]
fn oversized_word_gets_its_own_line() {
    // HUGE is 20pt, line width 15pt
    let lines = lines_of("ab HUGE cd", 15.0);
    assert_eq!(lines, ["ab", "HUGE", "cd"]);

    let lines = break_lines(&[TextRun::normal("ab HUGE cd")], 15.0, fixed_measure).unwrap();
    assert_eq!(lines[1].width, 20.0);
    assert_eq!(lines[1].tokens.len(), 1);
}

#[test]
fn oversized_first_word_does_not_leave_an_empty_line() {
    assert_eq!(lines_of("ENORMOUS ab", 15.0), ["ENORMOUS", "ab"]);
}

#[test]
fn style_change_inside_a_word_is_not_a_break_point() {
    let runs = [TextRun::normal("xx pre"), TextRun::bold("fix"), TextRun::normal(" yy")];
    let lines = break_lines(&runs, 40.0, fixed_measure).unwrap();
    let texts: Vec<String> = lines.iter().map(|l| l.text()).collect();
    assert_eq!(texts, ["xx", "prefix", "yy"]);
    assert!(lines[1].tokens[1].bold);
    assert_eq!(lines[1].tokens[1].x, 15.0);
}

#[test]
fn wrap_drops_whitespace_and_positions_are_cumulative() {
    let lines = break_lines(&[TextRun::normal("one two   three")], 40.0, fixed_measure).unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].text(), "one two");
    assert_eq!(lines[1].text(), "three");
    assert_eq!(lines[1].tokens[0].x, 0.0);

    let xs: Vec<f32> = lines[0].tokens.iter().map(|t| t.x).collect();
    assert_eq!(xs, [0.0, 15.0, 20.0]);
    assert_eq!(lines[0].width, 35.0);
}

#[test]
fn leading_whitespace_kept_on_first_line_only() {
    let lines = lines_of("  indented text here", 60.0);
    assert_eq!(lines, ["  indented", "text here"]);
}

#[test]
fn non_finite_measurement_aborts() {
    let err = break_lines(&[TextRun::normal("a b")], 100.0, |t, _| {
        Ok(if t == "b" { f32::NAN } else { 1.0 })
    })
    .unwrap_err();
    assert!(matches!(err, Error::Measurement { ref text, .. } if text == "b"));

    let err = break_lines(&[TextRun::normal("a")], 100.0, |_, _| Ok(-1.0)).unwrap_err();
    assert!(matches!(err, Error::Measurement { .. }));
}

#[test]
fn measurement_errors_propagate() {
    let err = break_lines(&[TextRun::normal("a")], 100.0, |_, _| {
        Err(Error::Font("no glyphs".into()))
    })
    .unwrap_err();
    assert!(matches!(err, Error::Font(_)));
}

#[test]
fn layout_is_deterministic() {
    let text = common::prose(7, 200);
    let Paragraph::Runs(runs) = &segment(&text)[0] else {
        panic!("blank");
    };
    let a = break_lines(runs, 150.0, fixed_measure).unwrap();
    let b = break_lines(runs, 150.0, fixed_measure).unwrap();
    assert_eq!(a, b);
}
