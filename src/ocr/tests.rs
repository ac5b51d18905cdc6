use super::*;

const SAMPLE_TSV: &str = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext\n\
1\t1\t0\t0\t0\t0\t0\t0\t600\t800\t-1\t\n\
4\t1\t1\t1\t1\t0\t40\t100\t500\t18\t-1\t\n\
5\t1\t1\t1\t1\t1\t40\t100\t80\t18\t96.5\tProduct\n\
5\t1\t1\t1\t1\t2\t200\t100\t40\t18\t95.0\tQty\n\
5\t1\t1\t1\t2\t1\t40\t130\t90\t18\t91.2\tWidget\n\
5\t1\t1\t1\t2\t2\t200\t130\t20\t18\t12.0\tsmudge\n";

#[test]
fn parse_tsv_keeps_word_rows_with_geometry() {
    let words = parse_tsv(SAMPLE_TSV);

    assert_eq!(words.len(), 4);
    assert_eq!(words[0].word.text, "Product");
    assert_eq!(words[0].word.x0, 40.0);
    assert_eq!(words[0].word.x1, 120.0);
    assert_eq!(words[0].line_key, (1, 1, 1));
    assert_eq!(words[2].line_key, (1, 1, 2));
}

#[test]
fn confidence_filter_drops_low_scoring_words() {
    let words = parse_tsv(SAMPLE_TSV)
        .into_iter()
        .filter(|entry| entry.confidence >= MIN_WORD_CONFIDENCE)
        .collect::<Vec<OcrWord>>();

    assert_eq!(words.len(), 3);
    assert!(words.iter().all(|entry| entry.word.text != "smudge"));
}

#[test]
fn words_into_lines_groups_by_engine_line_key() {
    let words = parse_tsv(SAMPLE_TSV);
    let lines = words_into_lines(words);

    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].len(), 2);
    assert_eq!(lines[0][0].text, "Product");
    assert_eq!(lines[1][0].text, "Widget");
}
