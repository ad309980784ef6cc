//! CSV export of classified comments.

use crate::pipeline::ResultSet;

// Column names kept compatible with the dashboard's historical exports.
const CSV_HEADER: &str = "Comment,Sentiment";

/// Render one row per classified comment, in fetch order.
pub fn to_csv(results: &ResultSet) -> String {
    let mut out = String::with_capacity(results.comments.len() * 48 + CSV_HEADER.len() + 1);
    out.push_str(CSV_HEADER);
    out.push('\n');

    for comment in &results.comments {
        push_field(&mut out, &comment.text);
        out.push(',');
        out.push_str(comment.sentiment.as_str());
        out.push('\n');
    }

    out
}

// Quote a field only when it contains a delimiter, quote, or line break.
fn push_field(out: &mut String, field: &str) {
    if field.contains([',', '"', '\n', '\r']) {
        out.push('"');
        out.push_str(&field.replace('"', "\"\""));
        out.push('"');
    } else {
        out.push_str(field);
    }
}
