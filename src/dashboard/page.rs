//! Server-side HTML rendering of the dashboard page.
//!
//! The page is assembled from strings; every piece of API- or user-supplied
//! text goes through [`escape_html`]. Figures are embedded as JSON and drawn
//! by Plotly in the browser.

use std::fmt::Write;

use crate::analysis::{ArtistSummary, TrackRecord};
use crate::charts::{DashboardFigures, Figure};
use crate::discography::Discography;
use crate::html::escape_html;

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

const STYLE: &str = r#"
body { margin: 1.5em; }
h3, h4, h5 { font-family: Arial, sans-serif; }
table { border-collapse: collapse; font-family: Arial, sans-serif; font-size: 13px; }
th, td { border: 1px solid #ccc; padding: 4px 8px; text-align: left; }
th { background: #f2f2f2; }
table.sortable th { cursor: pointer; }
.notice { font-family: Arial, sans-serif; color: #a00; }
.row { display: flex; width: 100%; }
.row > .left { width: 40%; }
.row > .right { width: 60%; }
"#;

/// Sorts a table when a header cell is clicked; numeric when both cells parse.
const SORT_SCRIPT: &str = r#"
document.querySelectorAll("table.sortable th").forEach(function (th, col) {
  th.addEventListener("click", function () {
    var body = th.closest("table").tBodies[0];
    var asc = th.dataset.dir !== "asc";
    th.dataset.dir = asc ? "asc" : "desc";
    Array.from(body.rows)
      .sort(function (a, b) {
        var x = a.cells[col].textContent, y = b.cells[col].textContent;
        var nx = parseFloat(x), ny = parseFloat(y);
        var cmp = (!isNaN(nx) && !isNaN(ny)) ? nx - ny : x.localeCompare(y);
        return asc ? cmp : -cmp;
      })
      .forEach(function (row) { body.appendChild(row); });
  });
});
"#;

/// Request-independent parts of the page.
#[derive(Debug, Clone)]
pub struct PageContext<'a> {
    /// Artist name as typed into the search box.
    pub artist: &'a str,
    /// Selected peer network size.
    pub peers: usize,
    /// Sizes offered in the dropdown.
    pub peer_sizes: &'a [usize],
    /// Seconds between automatic reloads.
    pub refresh_secs: u64,
}

/// Serialize a figure for a `<script>` block without allowing `</script>`.
fn figure_json(figure: &Figure) -> String {
    serde_json::to_string(figure)
        .unwrap_or_else(|_| "{\"data\":[],\"layout\":{}}".to_string())
        .replace('<', "\\u003c")
}

fn table(columns: &[&str], rows: &[Vec<String>], id: &str, sortable: bool) -> String {
    let mut html = String::new();
    let class = if sortable { " class=\"sortable\"" } else { "" };
    let _ = write!(html, "<table id=\"{}\"{}><thead><tr>", id, class);
    for column in columns {
        let _ = write!(html, "<th>{}</th>", escape_html(column));
    }
    html.push_str("</tr></thead><tbody>");
    for row in rows {
        html.push_str("<tr>");
        for cell in row {
            let _ = write!(html, "<td>{}</td>", escape_html(cell));
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table>");
    html
}

/// Render the one-row artist overview.
pub fn summary_table(summary: &ArtistSummary) -> String {
    table(
        &ArtistSummary::COLUMNS,
        &[summary.cells()],
        "artist-summary-table",
        false,
    )
}

/// Render the sortable discography table.
pub fn discography_table(tracks: &[TrackRecord]) -> String {
    let rows: Vec<Vec<String>> = tracks.iter().map(TrackRecord::cells).collect();
    table(&TrackRecord::COLUMNS, &rows, "release-history-table", true)
}

/// Search box, overview section holding `overview` and the peer-size dropdown.
fn search_form(ctx: &PageContext<'_>, overview: &str) -> String {
    let mut options = String::new();
    for size in ctx.peer_sizes {
        let selected = if *size == ctx.peers { " selected" } else { "" };
        let _ = write!(options, "<option value=\"{size}\"{selected}>{size}</option>");
    }

    format!(
        r#"<h3>SEARCH ARTIST</h3>
<form id="search" method="get" action="/">
<input id="input-artist" name="artist" type="text" placeholder="Enter name of artist..." value="{artist}">
<input type="hidden" name="peers" value="{peers}">
<button type="submit">Search</button>
</form>
<h3>ARTIST OVERVIEW</h3>
{overview}
<h5>Compare metrics to similar artists (select # of artists below)</h5>
<form method="get" action="/">
<input type="hidden" name="artist" value="{artist}">
<select id="dropdown" name="peers" onchange="this.form.submit()">{options}</select>
</form>
<br>
<div id="rankings-table"><p class="notice" id="rankings-status">Loading peer comparison...</p></div>"#,
        artist = escape_html(ctx.artist),
        peers = ctx.peers,
    )
}

fn shell(ctx: &PageContext<'_>, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta http-equiv="refresh" content="{refresh}">
<title>{title} - Artist Dashboard</title>
<style>{style}</style>
<script src="{plotly}"></script>
</head>
<body>
{body}
</body>
</html>
"#,
        refresh = ctx.refresh_secs,
        title = escape_html(ctx.artist),
        style = STYLE,
        plotly = PLOTLY_CDN,
        body = body,
    )
}

fn rankings_script(ctx: &PageContext<'_>) -> String {
    format!(
        r#"<script>
fetch("/api/peers?artist={artist}&size={size}")
  .then(function (r) {{ return r.json().then(function (body) {{ return [r.ok, body]; }}); }})
  .then(function (res) {{
    var target = document.getElementById("rankings-table");
    if (!res[0]) {{
      target.innerHTML = "";
      var p = document.createElement("p");
      p.className = "notice";
      p.textContent = res[1].error;
      target.appendChild(p);
      return;
    }}
    var t = document.createElement("table");
    var head = t.createTHead().insertRow();
    var row = t.createTBody().insertRow();
    ["spot_followers_ranking", "spot_popularity_ranking"].forEach(function (k) {{
      var th = document.createElement("th");
      th.textContent = k;
      head.appendChild(th);
      row.insertCell().textContent = res[1][k];
    }});
    target.innerHTML = "";
    target.appendChild(t);
  }})
  .catch(function () {{
    document.getElementById("rankings-status").textContent = "Peer comparison request failed";
  }});
</script>"#,
        artist = urlencoding::encode(ctx.artist),
        size = ctx.peers,
    )
}

/// Render the full dashboard for a successfully retrieved artist.
pub fn render_dashboard(
    ctx: &PageContext<'_>,
    discography: &Discography,
    figures: &DashboardFigures,
) -> String {
    let mut body = search_form(ctx, &summary_table(&discography.summary));

    body.push_str(
        r#"
<br>
<h3>RELEASE HISTORY OVERVIEW</h3>
<div class="row">
<div class="left"><h4>Distribution of track popularity scores</h4><div id="histogram"></div></div>
<div class="right"><h4>Record label partners</h4><div id="label-chart"></div></div>
</div>
<h4>Total releases per year</h4>
<div id="bar-chart"></div>
<h4>Track popularity scores (grouped by year)</h4>
<div id="box-whisker"></div>
<h4>Artist's release timeline</h4>
<p>The plot below displays the point in their career that the artist released each one of their albums, EP, and singles. A line chart is included to highlight the most popular track from each release event.</p>
<div id="scatter-plot"></div>
<h4>Artist's discography</h4>
"#,
    );
    body.push_str(&discography_table(&discography.tracks));

    body.push_str("\n<script>\n");
    for (id, figure) in figures.named() {
        let _ = writeln!(
            body,
            "{{ const f = {}; Plotly.newPlot(\"{}\", f.data, f.layout); }}",
            figure_json(figure),
            id
        );
    }
    body.push_str(SORT_SCRIPT);
    body.push_str("</script>\n");
    body.push_str(&rankings_script(ctx));

    shell(ctx, &body)
}

/// Render the page with a message in place of the artist's data.
pub fn render_error(ctx: &PageContext<'_>, message: &str) -> String {
    let notice = format!("<p class=\"notice\">{}</p>", escape_html(message));
    let mut body = search_form(ctx, &notice);
    body.push_str(&rankings_script(ctx));
    shell(ctx, &body)
}
