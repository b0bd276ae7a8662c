use logframe_core::frame::Frame;
use std::fmt::Write;

/// Renders a frame as a tab-separated table followed by its notices.
pub fn render_frame(frame: &Frame) -> String {
    let mut out = String::new();
    if let Some(query) = frame.executed_query() {
        let _ = writeln!(out, "-- {query}");
    }
    let header: Vec<String> = frame.columns.iter().map(|c| c.display_name()).collect();
    let _ = writeln!(out, "{}", header.join("\t"));
    for row in 0..frame.row_count() {
        let cells: Vec<String> = frame
            .columns
            .iter()
            .map(|c| {
                c.values
                    .get(row)
                    .map(|v| v.to_string())
                    .unwrap_or_default()
            })
            .collect();
        let _ = writeln!(out, "{}", cells.join("\t"));
    }
    let _ = writeln!(out, "({} rows)", frame.row_count());
    for notice in &frame.notices {
        let _ = writeln!(out, "{notice}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::render_frame;
    use logframe_core::frame::{Column, ColumnValues, Frame, Labels, Notice};

    #[test]
    fn renders_rows_nulls_and_notices() {
        let mut frame = Frame::new("t");
        frame
            .push_column(Column::new("Value", ColumnValues::Int32(vec![Some(5), None])).with_labels(
                [("Region", "us")].into_iter().collect::<Labels>(),
            ))
            .expect("push");
        frame.set_executed_query("Events");
        frame.append_notice(Notice::warning("not a time series"));

        let text = render_frame(&frame);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "-- Events",
                r#"Value {Region="us"}"#,
                "5",
                "null",
                "(2 rows)",
                "[warning] not a time series",
            ]
        );
    }
}
