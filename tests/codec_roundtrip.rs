use meme_narrator::{
    batch::Batch,
    codec::{DecodeWarning, decode, encode},
};

fn batch(pairs: &[(&str, &str)]) -> Batch {
    pairs.iter().copied().collect()
}

#[test]
fn decode_of_encode_is_identity() {
    let b = batch(&[
        ("drake", "hotline bling no. hotline bling yes"),
        ("distracted boyfriend", "me / rust / every other language"),
        ("two lines", "top text\nbottom text"),
        ("quiet", ""),
        ("zzz", "sleep"),
    ]);
    let decoded = decode(&encode(&b));
    assert_eq!(decoded.batch, b);
    assert_eq!(
        decoded.batch.ids().collect::<Vec<_>>(),
        vec!["drake", "distracted boyfriend", "two lines", "quiet", "zzz"]
    );
}

#[test]
fn encode_layout() {
    let b = batch(&[("a", "hello"), ("b", ""), ("c", "x\ny")]);
    assert_eq!(encode(&b), "a:\nhello\n\nb:\n\nc:\nx\ny\n\n");
    assert_eq!(encode(&Batch::new()), "");
}

#[test]
fn malformed_header_drops_only_that_block() {
    let doc = "one:\nfirst\n\nno colon here\nsome text\n\nthree:\nthird\n";
    let decoded = decode(doc);
    assert_eq!(decoded.batch, batch(&[("one", "first"), ("three", "third")]));
    assert_eq!(
        decoded.warnings,
        vec![DecodeWarning::MalformedHeader("no colon here".into())]
    );
    assert_eq!(
        decoded.warnings[0].to_string(),
        "block header does not end with ':' -> no colon here"
    );
}

#[test]
fn duplicate_id_keeps_later_text() {
    let doc = "cat:\nfirst take\n\ndog:\nwoof\n\ncat:\nsecond take\n";
    let decoded = decode(doc);
    assert_eq!(decoded.batch.len(), 2);
    assert_eq!(decoded.batch.get("cat"), Some("second take"));
    assert!(decoded.warnings.is_empty());
}

#[test]
fn empty_text_is_kept_with_warning() {
    let decoded = decode("silent:\n\nloud:\nAAAA\n");
    assert_eq!(decoded.batch, batch(&[("silent", ""), ("loud", "AAAA")]));
    assert_eq!(decoded.warnings, vec![DecodeWarning::EmptyText("silent".into())]);
    assert_eq!(decoded.warnings[0].to_string(), "no text found for image silent");
}

#[test]
fn human_edits_are_tolerated() {
    // Extra blank and whitespace-only lines, indentation, CRLF with a BOM, and
    // a header typed without a blank line before it (still part of the block).
    let doc = "\u{feff}\r\n\r\n  doge  :  \r\n   such wow   \r\n   very rust\r\n \t \r\n\r\n\r\nrenamed:\r\nnew text\r\nadded:\r\n";
    let decoded = decode(doc);
    assert_eq!(
        decoded.batch,
        batch(&[("doge", "such wow\nvery rust"), ("renamed", "new text\nadded:")])
    );
    assert!(decoded.warnings.is_empty());
}

#[test]
fn text_line_ending_in_colon_after_blank_line_becomes_header() {
    let decoded = decode("meme:\nwait for it:\n\nthe punchline:\n");
    assert_eq!(decoded.batch.get("meme"), Some("wait for it:"));
    assert_eq!(decoded.batch.get("the punchline"), Some(""));
}

#[test]
fn empty_document_decodes_to_empty_batch() {
    for doc in ["", "\n\n", "   \n\t\n"] {
        let decoded = decode(doc);
        assert!(decoded.batch.is_empty());
        assert!(decoded.warnings.is_empty());
    }
}
