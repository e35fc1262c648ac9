use crate::flash::Flash;
use std::fmt::Write;
use stockviz_core::domain::{ChartKind, Periodicity};
use stockviz_core::symbols::SymbolList;

/// A rendered chart ready to embed in the page.
pub struct ChartView<'a> {
    pub symbol: &'a str,
    pub data_uri: &'a str,
}

pub fn index(symbols: &SymbolList, messages: &[Flash], chart: Option<&ChartView<'_>>) -> String {
    let mut html = String::with_capacity(4096);
    html.push_str(
        "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Stock Data Visualizer</title>\n</head>\n<body>\n<h1>Stock Data Visualizer</h1>\n",
    );

    for flash in messages {
        let _ = writeln!(
            html,
            "<div class=\"alert alert-{}\">{}</div>",
            flash.level.as_str(),
            escape(&flash.message)
        );
    }

    html.push_str("<form method=\"post\" action=\"/chart\">\n");

    html.push_str("<label for=\"symbol\">Symbol</label>\n<select id=\"symbol\" name=\"symbol\">\n");
    for symbol in symbols.iter() {
        let selected = if chart.is_some_and(|c| c.symbol == symbol) { " selected" } else { "" };
        let _ = writeln!(
            html,
            "<option value=\"{0}\"{selected}>{0}</option>",
            escape(symbol)
        );
    }
    html.push_str("</select>\n");

    html.push_str("<label for=\"chart_type\">Chart type</label>\n<select id=\"chart_type\" name=\"chart_type\">\n");
    for kind in [ChartKind::Line, ChartKind::Bar] {
        let _ = writeln!(html, "<option value=\"{kind}\">{kind}</option>");
    }
    html.push_str("</select>\n");

    html.push_str("<label for=\"time_series\">Time series</label>\n<select id=\"time_series\" name=\"time_series\">\n");
    for p in Periodicity::ALL {
        let _ = writeln!(html, "<option value=\"{0}\">{0}</option>", p.label());
    }
    html.push_str("</select>\n");

    html.push_str(
        "<label for=\"start_date\">Start date</label>\n\
         <input type=\"date\" id=\"start_date\" name=\"start_date\" required>\n\
         <label for=\"end_date\">End date</label>\n\
         <input type=\"date\" id=\"end_date\" name=\"end_date\" required>\n\
         <button type=\"submit\">Generate chart</button>\n</form>\n",
    );

    if let Some(chart) = chart {
        let _ = writeln!(
            html,
            "<img class=\"chart\" src=\"{}\" alt=\"{} closing prices\">",
            escape(chart.data_uri),
            escape(chart.symbol)
        );
    }

    html.push_str("</body>\n</html>\n");
    html
}

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
