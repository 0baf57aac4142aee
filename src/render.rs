//! Plain-text views of the search client: price formatting, product cards,
//! the notification area, tabs and the dashboard placeholder.

use crate::client::PriceApi;
use crate::data_models::{HealthReport, Product, SearchResponse, SupportedSites};
use crate::notify::{NotificationCenter, NotificationKind};
use crate::search_client::{LOADING_MESSAGE, SearchClient, SearchState, Tab};

pub const PRICE_NOT_AVAILABLE: &str = "Price not available";
pub const PRICE_NOT_EXTRACTED: &str = "Price not extracted";
pub const SEARCH_BUTTON_LABEL: &str = "Search with Gemini AI Vision";
pub const QUERY_PLACEHOLDER: &str =
    "e.g., Sony WH-1000XM5 Headphones, iPhone 15 Pro, MacBook Air...";

struct CurrencyStyle {
    symbol: &'static str,
    fraction_digits: u32,
}

fn currency_style(code: &str) -> Option<CurrencyStyle> {
    let (symbol, fraction_digits) = match code.to_ascii_uppercase().as_str() {
        "USD" => ("$", 2),
        "EUR" => ("€", 2),
        "GBP" => ("£", 2),
        "JPY" => ("¥", 0),
        "INR" => ("₹", 2),
        "KRW" => ("₩", 0),
        "CAD" => ("CA$", 2),
        "AUD" => ("A$", 2),
        "MXN" => ("MX$", 2),
        "CNY" => ("CN¥", 2),
        _ => return None,
    };
    Some(CurrencyStyle {
        symbol,
        fraction_digits,
    })
}

fn group_thousands(n: u128) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// en-US number with grouping and a fixed number of fraction digits.
///
/// Rounds half away from zero on the shortest decimal form of `value`, so
/// `1.005` becomes `1.01` even though the nearest binary float is slightly
/// below it.
pub fn format_amount(value: f64, fraction_digits: u32) -> String {
    let digits = fraction_digits as usize;
    // f64 Display never uses an exponent and prints the shortest round-trip form
    let decimal = format!("{}", value.abs());
    let (int_part, frac_part) = decimal.split_once('.').unwrap_or((decimal.as_str(), ""));

    let kept: String = frac_part
        .chars()
        .chain(std::iter::repeat('0'))
        .take(digits)
        .collect();
    let round_up = frac_part.as_bytes().get(digits).is_some_and(|d| *d >= b'5');

    let scale = 10u128.pow(fraction_digits);
    let mut scaled = format!("{int_part}{kept}").parse::<u128>().unwrap_or(0);
    if round_up {
        scaled += 1;
    }

    let whole = group_thousands(scaled / scale);
    if fraction_digits == 0 {
        whole
    } else {
        format!("{whole}.{:0digits$}", scaled % scale)
    }
}

/// Formats a price in en-US style for the given ISO currency code.
pub fn format_price(price: Option<f64>, currency: &str) -> String {
    let Some(price) = price.filter(|p| p.is_finite()) else {
        return PRICE_NOT_AVAILABLE.to_string();
    };
    let sign = if price < 0.0 { "-" } else { "" };
    match currency_style(currency) {
        Some(style) => format!(
            "{sign}{}{}",
            style.symbol,
            format_amount(price, style.fraction_digits)
        ),
        None => format!(
            "{sign}{}\u{a0}{}",
            currency.to_ascii_uppercase(),
            format_amount(price, 2)
        ),
    }
}

pub fn confidence_badge(confidence: Option<f64>) -> Option<String> {
    confidence.map(|c| format!("{}% confidence", (c * 100.0).round() as i64))
}

/// Ids are only unique per site, so the list position is part of the key.
pub fn product_key(product: &Product, position: usize) -> String {
    format!("{}-{}-{}", product.site, product.id, position)
}

pub fn product_card(product: &Product) -> Vec<String> {
    let mut lines = Vec::with_capacity(4);
    match confidence_badge(product.extraction_confidence) {
        Some(badge) => lines.push(format!("[{}] {badge}", product.site)),
        None => lines.push(format!("[{}]", product.site)),
    }
    lines.push(product.product_name.clone());
    if product.price.is_some() {
        lines.push(format_price(product.price, &product.currency));
    } else {
        lines.push(PRICE_NOT_EXTRACTED.to_string());
    }
    if let Some(url) = &product.product_url {
        lines.push(format!("View on {}: {url}", product.site));
    }
    lines
}

pub fn results_header(response: &SearchResponse) -> Vec<String> {
    let mut meta = format!(
        "Search ID: #{} • Status: {}",
        response.search_id, response.status
    );
    if let Some(ms) = response.search_time_ms {
        meta.push_str(&format!(" • Time: {ms}ms"));
    }
    vec![format!("Search Results for \"{}\"", response.query), meta]
}

/// Header followed by one card per product, in server order.
pub fn render_results(response: &SearchResponse) -> String {
    let mut lines = results_header(response);
    for (position, product) in response.results.iter().enumerate() {
        lines.push(String::new());
        lines.push(format!("#{}", product_key(product, position)));
        lines.extend(product_card(product).into_iter().map(|l| format!("  {l}")));
    }
    lines.join("\n")
}

pub fn render_notifications(center: &NotificationCenter) -> String {
    center
        .active()
        .iter()
        .map(|n| {
            let marker = match n.kind {
                NotificationKind::Loading => "…",
                NotificationKind::Success => "✓",
                NotificationKind::Error => "✗",
                NotificationKind::Info => "i",
            };
            format!("{marker} {}", n.message)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_tab_bar(active: Tab) -> String {
    let tab = |tab: Tab, label: &str| {
        if tab == active {
            format!("[{label}]")
        } else {
            format!(" {label} ")
        }
    };
    format!(
        "AI Price Aggregator   {} {}",
        tab(Tab::Search, "Search"),
        tab(Tab::Dashboard, "Dashboard")
    )
}

pub fn render_search_form<A: PriceApi>(client: &SearchClient<A>) -> String {
    let input = if client.query().is_empty() {
        QUERY_PLACEHOLDER.to_string()
    } else {
        client.query().to_string()
    };
    let input_state = if client.is_input_enabled() {
        ""
    } else {
        " (disabled)"
    };
    let button = if client.is_searching() {
        format!("< {LOADING_MESSAGE} >")
    } else if client.can_submit() {
        format!("< {SEARCH_BUTTON_LABEL} >")
    } else {
        format!("< {SEARCH_BUTTON_LABEL} > (disabled)")
    };
    format!("> {input}{input_state}\n{button}")
}

pub fn render_showcase() -> String {
    [
        "Gemini Vision Extraction: parses product listings visually from screenshots.",
        "Gemini Pro Processing: standardizes varied price formats into structured data.",
        "Interface Independent: works with any e-commerce layout without configuration.",
    ]
    .join("\n")
}

pub fn render_dashboard() -> String {
    "Dashboard\nAnalytics are not available yet.".to_string()
}

pub fn render_view<A: PriceApi>(client: &SearchClient<A>) -> String {
    let mut sections = vec![render_tab_bar(client.active_tab())];
    let notifications = render_notifications(client.notifications());
    if !notifications.is_empty() {
        sections.push(notifications);
    }

    match client.active_tab() {
        Tab::Dashboard => sections.push(render_dashboard()),
        Tab::Search => {
            sections.push(render_search_form(client));
            match (client.current_response(), client.state()) {
                (Some(response), _) => sections.push(render_results(response)),
                (None, SearchState::Searching { .. }) => {}
                (None, _) => sections.push(render_showcase()),
            }
        }
    }
    sections.join("\n\n")
}

pub fn render_health(report: &HealthReport) -> String {
    let mut lines = vec![
        format!("status: {}", report.status),
        format!("version: {}", report.version),
        format!("ai provider: {}", report.ai_provider),
        format!("timestamp: {}", report.timestamp),
    ];
    lines.extend(
        report
            .services
            .iter()
            .map(|(name, state)| format!("  {name}: {state}")),
    );
    lines.join("\n")
}

pub fn render_sites(sites: &SupportedSites) -> String {
    let mut lines = vec![format!(
        "{} supported sites ({})",
        sites.total_sites, sites.ai_provider
    )];
    lines.extend(
        sites
            .supported_sites
            .iter()
            .map(|s| format!("  {} [{}]", s.site, s.status)),
    );
    lines.join("\n")
}

#[test]
fn test_group_thousands() {
    assert_eq!(group_thousands(0), "0");
    assert_eq!(group_thousands(999), "999");
    assert_eq!(group_thousands(1000), "1,000");
    assert_eq!(group_thousands(1234567), "1,234,567");
}

#[test]
fn test_format_amount_rounds_on_decimal_form() {
    assert_eq!(format_amount(1.005, 2), "1.01");
    assert_eq!(format_amount(1.115, 2), "1.12");
    assert_eq!(format_amount(1.004, 2), "1.00");
    assert_eq!(format_amount(1e21, 0), "1,000,000,000,000,000,000,000");
}
