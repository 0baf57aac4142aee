use std::time::Duration;

use pricefind::client::PriceApi;
use pricefind::data_models::{Product, SearchRequest, SearchResponse, SearchStatus};
use pricefind::error::ClientError;
use pricefind::render::*;
use pricefind::search_client::{SearchClient, SearchSettings, Tab};

mod test_helpers {
    use super::*;

    pub struct EchoApi;

    impl PriceApi for EchoApi {
        async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, ClientError> {
            Ok(response(&request.query, vec![bare_product(7, "amazon.com", "Echo Dot")]))
        }
    }

    pub struct DownApi;

    impl PriceApi for DownApi {
        async fn search(&self, _request: &SearchRequest) -> Result<SearchResponse, ClientError> {
            Err(ClientError::Status(reqwest::StatusCode::BAD_GATEWAY))
        }
    }

    pub fn bare_product(id: i64, site: &str, name: &str) -> Product {
        Product {
            id,
            site: site.to_string(),
            product_name: name.to_string(),
            price: None,
            currency: "USD".to_string(),
            product_url: None,
            image_url: None,
            extracted_at: "2024-05-01T10:00:00".to_string(),
            extraction_confidence: None,
        }
    }

    pub fn response(query: &str, results: Vec<Product>) -> SearchResponse {
        SearchResponse {
            search_id: 9,
            query: query.to_string(),
            status: SearchStatus::Completed,
            total_found: results.len() as u64,
            results,
            search_time_ms: Some(1520),
            sites_searched: vec!["amazon.com".to_string()],
            cached_results: 0,
            fresh_results: 1,
            error_message: None,
        }
    }

    pub fn client() -> SearchClient<EchoApi> {
        SearchClient::new(EchoApi, SearchSettings::default(), Duration::from_secs(4))
    }
}

use test_helpers::*;

#[cfg(test)]
mod price_tests {
    use super::*;

    #[test]
    fn test_usd_with_grouping() {
        assert_eq!(format_price(Some(1299.99), "USD"), "$1,299.99");
        assert_eq!(format_price(Some(1234567.891), "USD"), "$1,234,567.89");
        assert_eq!(format_price(Some(5.0), "USD"), "$5.00");
        assert_eq!(format_price(Some(0.0), "USD"), "$0.00");
    }

    #[test]
    fn test_absent_price() {
        assert_eq!(format_price(None, "USD"), "Price not available");
        assert_eq!(format_price(Some(f64::NAN), "USD"), "Price not available");
    }

    #[test]
    fn test_other_currencies() {
        assert_eq!(format_price(Some(349.5), "EUR"), "€349.50");
        assert_eq!(format_price(Some(12.0), "gbp"), "£12.00");
        assert_eq!(format_price(Some(1299.5), "JPY"), "¥1,300");
        assert_eq!(format_price(Some(99.99), "CAD"), "CA$99.99");
        assert_eq!(format_price(Some(12.5), "CHF"), "CHF\u{a0}12.50");
    }

    #[test]
    fn test_negative_amount() {
        assert_eq!(format_price(Some(-5.0), "USD"), "-$5.00");
    }

    #[test]
    fn test_format_amount_rounds_half_cent() {
        assert_eq!(format_amount(0.005, 2), "0.01");
        assert_eq!(format_amount(999.999, 2), "1,000.00");
    }
}

#[cfg(test)]
mod product_tests {
    use super::*;

    #[test]
    fn test_confidence_badge() {
        assert_eq!(confidence_badge(Some(0.956)), Some("96% confidence".to_string()));
        assert_eq!(confidence_badge(Some(0.9)), Some("90% confidence".to_string()));
        assert_eq!(confidence_badge(Some(0.0)), Some("0% confidence".to_string()));
        assert_eq!(confidence_badge(None), None);
    }

    #[test]
    fn test_product_key_tolerates_duplicate_ids() {
        let a = bare_product(1, "amazon.com", "A");
        let b = bare_product(1, "walmart.com", "B");
        assert_eq!(product_key(&a, 0), "amazon.com-1-0");
        assert_ne!(product_key(&a, 0), product_key(&b, 0));
        assert_ne!(product_key(&a, 0), product_key(&a, 1));
    }

    #[test]
    fn test_card_without_optional_fields() {
        let card = product_card(&bare_product(3, "bestbuy.com", "Mystery Box")).join("\n");
        assert!(card.contains("Mystery Box"));
        assert!(card.contains(PRICE_NOT_EXTRACTED));
        assert!(!card.contains("View on"));
        assert!(!card.contains("confidence"));
    }

    #[test]
    fn test_card_with_all_fields() {
        let mut product = bare_product(3, "bestbuy.com", "AirPods Pro");
        product.price = Some(229.99);
        product.product_url = Some("https://bestbuy.com/site/airpods".to_string());
        product.extraction_confidence = Some(0.92);

        let card = product_card(&product);
        assert_eq!(card[0], "[bestbuy.com] 92% confidence");
        assert_eq!(card[2], "$229.99");
        assert_eq!(card[3], "View on bestbuy.com: https://bestbuy.com/site/airpods");
    }
}

#[cfg(test)]
mod view_tests {
    use super::*;

    #[test]
    fn test_results_keep_server_order() {
        let body = response(
            "phone",
            vec![
                bare_product(2, "walmart.com", "Zeta Phone"),
                bare_product(1, "amazon.com", "Alpha Phone"),
                bare_product(2, "amazon.com", "Mid Phone"),
            ],
        );
        let text = render_results(&body);
        let zeta = text.find("Zeta Phone").unwrap();
        let alpha = text.find("Alpha Phone").unwrap();
        let mid = text.find("Mid Phone").unwrap();
        assert!(zeta < alpha && alpha < mid);
        assert!(text.contains("#amazon.com-2-2"));
    }

    #[test]
    fn test_results_header() {
        let mut body = response("switch", Vec::new());
        let header = results_header(&body);
        assert_eq!(header[0], "Search Results for \"switch\"");
        assert_eq!(header[1], "Search ID: #9 • Status: completed • Time: 1520ms");

        body.search_time_ms = None;
        assert_eq!(results_header(&body)[1], "Search ID: #9 • Status: completed");
    }

    #[test]
    fn test_idle_view_shows_showcase() {
        let client = client();
        let view = render_view(&client);
        assert!(view.contains("[Search]"));
        assert!(view.contains(QUERY_PLACEHOLDER));
        assert!(view.contains("Gemini Vision Extraction"));
        assert!(view.contains("(disabled)"));
    }

    #[test]
    fn test_searching_view_disables_form() {
        let mut client = client();
        client.set_query("echo dot");
        let (ticket, _) = client.begin_search().unwrap();

        let view = render_view(&client);
        assert!(view.contains("echo dot (disabled)"));
        assert!(!view.contains("Gemini Vision Extraction"));

        let body = response("echo dot", vec![bare_product(7, "amazon.com", "Echo Dot")]);
        client.finish_search(ticket, Ok(body));
        let view = render_view(&client);
        assert!(view.contains("✓ Found 1 products in 1520ms"));
        assert!(view.contains("Search Results for \"echo dot\""));
        assert!(view.contains(&format!("< {SEARCH_BUTTON_LABEL} >")));
        assert!(!view.contains("(disabled)"));
    }

    #[tokio::test]
    async fn test_showcase_returns_after_http_failure() {
        let mut client = SearchClient::new(DownApi, SearchSettings::default(), Duration::from_secs(4));
        client.set_query("echo dot");
        client.search().await;

        let view = render_view(&client);
        assert!(view.contains("✗ Failed to search products. Check if backend is running."));
        assert!(view.contains("Gemini Vision Extraction"));
        assert!(!view.contains("Search Results"));
    }

    #[tokio::test]
    async fn test_dashboard_tab_is_placeholder() {
        let mut client = client();
        client.set_query("echo");
        client.search().await;
        client.select_tab(Tab::Dashboard);

        let view = render_view(&client);
        assert!(view.contains("[Dashboard]"));
        assert!(view.contains("Analytics are not available yet."));
        assert!(!view.contains("Search Results"));
    }
}
