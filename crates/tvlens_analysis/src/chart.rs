use crate::error::AnalysisError;
use crate::timeframe::Timeframe;
use log::info;
use serde_json::json;
use std::path::Path;
use tvlens_shared_models::MergedRow;

/// Self-contained Plotly page with price on the left axis and TVL on the
/// right. The whole series is embedded; `window` only sets the initial
/// x-range, so zooming out in the browser shows the full history.
pub fn render_chart_html(
    title: &str,
    rows: &[MergedRow],
    window: Timeframe,
) -> Result<String, AnalysisError> {
    let (Some(first), Some(last)) = (rows.first(), rows.last()) else {
        return Err(AnalysisError::EmptySeries);
    };
    let start = window.start_date(first.date, last.date);

    let dates: Vec<String> = rows.iter().map(|r| r.date.to_string()).collect();
    let data = json!([
        {
            "x": dates,
            "y": rows.iter().map(|r| r.price).collect::<Vec<_>>(),
            "name": "Price (USD)",
            "type": "scatter",
            "line": { "color": "green" },
            "yaxis": "y"
        },
        {
            "x": dates,
            "y": rows.iter().map(|r| r.tvl_usd).collect::<Vec<_>>(),
            "name": "TVL (USD)",
            "type": "scatter",
            "line": { "color": "orange" },
            "yaxis": "y2"
        }
    ]);
    let layout = json!({
        "title": title,
        "hovermode": "x unified",
        "legend": { "orientation": "h" },
        "xaxis": { "range": [start.to_string(), last.date.to_string()] },
        "yaxis": { "title": "<b>Price (USD)</b>", "color": "green" },
        "yaxis2": {
            "title": "<b>TVL (USD)</b>",
            "color": "orange",
            "overlaying": "y",
            "side": "right",
            "rangemode": "tozero"
        }
    });

    Ok(format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>{title}</title>
    <meta charset="utf-8">
    <script src="https://cdn.plot.ly/plotly-latest.min.js"></script>
    <style>
        body {{ font-family: Arial, sans-serif; margin: 20px; }}
        .container {{ width: 100%; height: 600px; }}
    </style>
</head>
<body>
    <div class="container" id="chart"></div>
    <script>
        Plotly.newPlot('chart', {data}, {layout});
    </script>
</body>
</html>
"#,
        title = html_escape(title),
        data = serde_json::to_string(&data)?,
        layout = serde_json::to_string(&layout)?,
    ))
}

pub fn export_chart(path: &Path, html: &str) -> Result<(), AnalysisError> {
    std::fs::write(path, html)?;
    info!("Chart written to {}", path.display());
    Ok(())
}

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
