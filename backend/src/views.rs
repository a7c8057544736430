//! Server-rendered HTML pages.

use std::fmt::Write;

use worklocation_common::{IsoWeek, Location, WeekDates};

use crate::models::selection::{location_field_name, WeekSelections};

const STYLE: &str = "body{font-family:sans-serif;max-width:44rem;margin:2rem auto;padding:0 1rem}\
table{border-collapse:collapse;width:100%}td,th{padding:.4rem;border-bottom:1px solid #ddd;text-align:left}\
nav{display:flex;justify-content:space-between;margin:1rem 0}.notice{color:#256029}.error{color:#a00}";

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"de\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{}</title>\n<style>{}</style>\n</head>\n<body>\n{}</body>\n</html>\n",
        escape_html(title),
        STYLE,
        body
    )
}

fn week_link(week: IsoWeek, label: &str) -> String {
    format!("<a href=\"/?year={}&amp;week={}\">{}</a>", week.year, week.week, label)
}

/// Everything the week page shows.
pub struct WeekPage<'a> {
    pub username: &'a str,
    pub week: &'a WeekDates,
    pub selections: &'a WeekSelections,
    pub last_week: u32,
    pub saved: bool,
}

pub fn week_page(page: &WeekPage<'_>) -> String {
    let week = page.week;
    let current = week.iso_week();
    let mut body = String::new();

    let _ = write!(
        body,
        "<header><strong>{}</strong> &middot; <a href=\"/logout\">Abmelden</a></header>\n\
         <h1>Arbeitsorte KW {:02}/{}</h1>\n",
        escape_html(page.username),
        week.week,
        week.year
    );

    if page.saved {
        body.push_str("<p class=\"notice\">Gespeichert.</p>\n");
    }

    body.push_str("<nav>");
    body.push_str(&current.previous().map(|w| week_link(w, "&laquo; Vorherige Woche")).unwrap_or_default());
    body.push_str(&current.next().map(|w| week_link(w, "N&auml;chste Woche &raquo;")).unwrap_or_default());
    body.push_str("</nav>\n");

    let _ = write!(
        body,
        "<form method=\"get\" action=\"/\">\n\
         <label>Jahr <input type=\"number\" name=\"year\" value=\"{}\" min=\"1\" max=\"9999\"></label>\n\
         <label>KW <input type=\"number\" name=\"week\" value=\"{}\" min=\"1\" max=\"{}\"></label>\n\
         <button type=\"submit\">Anzeigen</button>\n</form>\n",
        week.year, week.week, page.last_week
    );

    let _ = write!(
        body,
        "<form method=\"post\" action=\"/save\">\n\
         <input type=\"hidden\" name=\"year\" value=\"{}\">\n\
         <input type=\"hidden\" name=\"week\" value=\"{}\">\n\
         <table>\n<tr><th>Wochentag</th><th>Datum</th><th>Standort</th></tr>\n",
        week.year, week.week
    );

    for ((day, weekday), selection) in week.named_days().zip(page.selections) {
        let field = location_field_name(day);
        let _ = write!(
            body,
            "<tr><td>{}</td><td>{}</td><td><select name=\"{}\">",
            weekday,
            day.format("%d.%m.%Y"),
            field
        );
        body.push_str(&option("", "&ndash;", selection.is_none()));
        for location in Location::ALL {
            body.push_str(&option(location.as_str(), location.as_str(), *selection == Some(location)));
        }
        body.push_str("</select></td></tr>\n");
    }

    body.push_str(
        "</table>\n<p>\n<button type=\"submit\">Speichern</button>\n\
         <button type=\"submit\" formaction=\"/download\">Speichern &amp; Excel herunterladen</button>\n\
         </p>\n</form>\n",
    );

    layout(&format!("Arbeitsorte KW {:02}/{}", week.week, week.year), &body)
}

fn option(value: &str, label: &str, selected: bool) -> String {
    format!(
        "<option value=\"{}\"{}>{}</option>",
        value,
        if selected { " selected" } else { "" },
        label
    )
}

pub fn login_page(error: Option<&str>, username: &str) -> String {
    let mut body = String::from("<h1>Anmelden</h1>\n");
    if let Some(error) = error {
        let _ = writeln!(body, "<p class=\"error\">{}</p>", escape_html(error));
    }
    let _ = write!(
        body,
        "<form method=\"post\" action=\"/login\">\n\
         <p><label>Benutzername <input name=\"username\" value=\"{}\" autocomplete=\"username\" required></label></p>\n\
         <p><label>Passwort <input type=\"password\" name=\"password\" autocomplete=\"current-password\" required></label></p>\n\
         <p><button type=\"submit\">Anmelden</button></p>\n</form>\n",
        escape_html(username)
    );
    layout("Anmelden", &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use worklocation_common::get_week_dates;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<b>\"Tom\" & 'Jerry'</b>"), "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;");
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_week_page_marks_selected_locations() {
        let week = get_week_dates(2024, 1).unwrap();
        let mut selections: WeekSelections = [None; 7];
        selections[0] = Some(Location::Customer);

        let html = week_page(&WeekPage {
            username: "alice",
            week: &week,
            selections: &selections,
            last_week: 52,
            saved: false,
        });

        assert!(html.contains("name=\"loc_2024-01-01\""));
        assert!(html.contains("name=\"loc_2024-01-07\""));
        assert!(html.contains("<option value=\"Customer\" selected>Customer</option>"));
        assert!(html.contains("Montag"));
        assert!(html.contains("Sonntag"));
        assert!(!html.contains("Gespeichert."));
    }

    #[test]
    fn test_week_page_navigation_crosses_years() {
        let week = get_week_dates(2024, 1).unwrap();
        let html = week_page(&WeekPage {
            username: "alice",
            week: &week,
            selections: &[None; 7],
            last_week: 52,
            saved: true,
        });

        assert!(html.contains("/?year=2023&amp;week=52"));
        assert!(html.contains("/?year=2024&amp;week=2"));
        assert!(html.contains("Gespeichert."));
    }

    #[test]
    fn test_week_page_escapes_username() {
        let week = get_week_dates(2024, 1).unwrap();
        let html = week_page(&WeekPage {
            username: "<script>",
            week: &week,
            selections: &[None; 7],
            last_week: 52,
            saved: false,
        });
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_login_page() {
        let html = login_page(Some("Falsch"), "bob\"");
        assert!(html.contains("<p class=\"error\">Falsch</p>"));
        assert!(html.contains("value=\"bob&quot;\""));
        assert!(!login_page(None, "").contains("class=\"error\""));
    }
}
