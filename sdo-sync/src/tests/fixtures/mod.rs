use std::fs;
use std::path::Path;

/// Load test HTML fixture by name
pub fn load_html_fixture(fixture_name: &str) -> String {
    let path = Path::new("src/tests/fixtures").join(format!("{}.html", fixture_name));
    fs::read_to_string(path)
        .unwrap_or_else(|_| panic!("Failed to load test fixture: {}", fixture_name))
}

/// A minimal directory index linking to each name.
pub fn listing_html(names: &[&str]) -> String {
    let mut html = String::from("<html><body><h1>Index</h1><pre>\n");
    html.push_str("<a href=\"../\">Parent Directory</a>\n");
    for name in names {
        html.push_str(&format!("<a href=\"{0}\">{0}</a>\n", name));
    }
    html.push_str("</pre></body></html>\n");
    html
}
