mod common;

use paperflow_pdf::{Paragraph, TextRun, parse_bold, segment};

fn runs(p: &Paragraph) -> &[TextRun] {
    match p {
        Paragraph::Runs(r) => r,
        Paragraph::Blank => panic!("expected runs, got blank"),
    }
}

#[test]
fn concatenated_runs_reproduce_marker_free_text() {
    for seed in 0..20 {
        let text = common::prose(seed, 60);
        let paragraphs = segment(&text);
        assert_eq!(paragraphs.len(), 1);
        let joined: String = runs(&paragraphs[0]).iter().map(|r| r.text.as_str()).collect();
        assert_eq!(joined, text.replace("**", ""), "seed {seed}");
    }
}

#[test]
fn each_marker_pair_yields_one_bold_run() {
    let line = "Q1. **Answer:** the **prime** numbers are **2, 3, 5**.";
    let parsed = parse_bold(line);
    let bold: Vec<&str> = parsed.iter().filter(|r| r.bold).map(|r| r.text.as_str()).collect();
    assert_eq!(bold, ["Answer:", "prime", "2, 3, 5"]);
    assert_eq!(
        parsed,
        vec![
            TextRun::normal("Q1. "),
            TextRun::bold("Answer:"),
            TextRun::normal(" the "),
            TextRun::bold("prime"),
            TextRun::normal(" numbers are "),
            TextRun::bold("2, 3, 5"),
            TextRun::normal("."),
        ]
    );
}

#[test]
fn unmatched_marker_stays_literal() {
    let parsed = parse_bold("**a** and **b");
    assert_eq!(
        parsed,
        vec![TextRun::bold("a"), TextRun::normal(" and **b")]
    );

    assert_eq!(parse_bold("2 ** 3"), vec![TextRun::normal("2 ** 3")]);
}

#[test]
fn markers_match_non_greedily() {
    let parsed = parse_bold("**x** y **z**");
    assert_eq!(
        parsed,
        vec![TextRun::bold("x"), TextRun::normal(" y "), TextRun::bold("z")]
    );
}

#[test]
fn whitespace_only_lines_become_blank_paragraphs() {
    let paragraphs = segment("first\n\n   \nlast");
    assert_eq!(paragraphs.len(), 4);
    assert_eq!(paragraphs[1], Paragraph::Blank);
    assert_eq!(paragraphs[2], Paragraph::Blank);
    assert_eq!(runs(&paragraphs[3]), [TextRun::normal("last")]);
}

#[test]
fn replacement_and_control_characters_are_dropped() {
    let paragraphs = segment("caf\u{FFFD}e\u{0007} au lait\r\nnext");
    assert_eq!(paragraphs.len(), 2);
    assert_eq!(runs(&paragraphs[0]), [TextRun::normal("cafe au lait")]);
    assert_eq!(runs(&paragraphs[1]), [TextRun::normal("next")]);
}

#[test]
fn tabs_expand_to_spaces() {
    let paragraphs = segment("a\tb");
    assert_eq!(runs(&paragraphs[0]), [TextRun::normal("a    b")]);
    assert!(paperflow_pdf::helvetica_text_width("a    b", false, 12.0)
        > paperflow_pdf::helvetica_text_width("ab", false, 12.0));

    assert_eq!(segment("\t"), vec![Paragraph::Blank]);
}

#[test]
fn empty_input_is_a_single_blank() {
    assert_eq!(segment(""), vec![Paragraph::Blank]);
}
