use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{Duration, Instant};

use crate::data_models::{Product, SearchRequest, SearchResponse, SearchStatus};

pub const SITES: [&str; 3] = ["amazon.com", "bestbuy.com", "walmart.com"];
pub const AI_PROVIDER: &str = "Gemini AI Vision";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

struct Listing {
    site: &'static str,
    name: &'static str,
    price: f64,
    url: &'static str,
}

const fn listing(site: &'static str, name: &'static str, price: f64, url: &'static str) -> Listing {
    Listing {
        site,
        name,
        price,
        url,
    }
}

// Known products, two listings per site.
static KNOWN_PRODUCTS: &[(&str, &[Listing])] = &[
    (
        "sony wh-1000xm5",
        &[
            listing("amazon.com", "Sony WH-1000XM5 Wireless Noise Canceling Headphones - Black", 349.99, "https://amazon.com/dp/B09XS7JWHH"),
            listing("amazon.com", "Sony WH-1000XM5 Wireless Headphones - Silver", 359.99, "https://amazon.com/dp/B09XS7JWHH"),
            listing("bestbuy.com", "Sony - WH-1000XM5 Wireless Noise Canceling Over-Ear Headphones - Black", 329.99, "https://bestbuy.com/site/sony-wh-1000xm5/6505727.p"),
            listing("bestbuy.com", "Sony WH-1000XM5 Premium Noise Canceling Wireless Headphones", 399.99, "https://bestbuy.com/site/sony-wh-1000xm5/6505728.p"),
            listing("walmart.com", "Sony WH-1000XM5 Wireless Noise Canceling Headphones, Black", 298.00, "https://walmart.com/ip/Sony-WH-1000XM5/395844662"),
            listing("walmart.com", "Sony WH1000XM5/B Premium Wireless Noise Canceling Headphones", 348.88, "https://walmart.com/ip/Sony-WH-1000XM5-Premium/395844663"),
        ],
    ),
    (
        "iphone 15 pro",
        &[
            listing("amazon.com", "Apple iPhone 15 Pro (128GB) - Natural Titanium", 999.00, "https://amazon.com/dp/B0CHX1W1XY"),
            listing("amazon.com", "Apple iPhone 15 Pro Max (256GB) - Blue Titanium", 1199.00, "https://amazon.com/dp/B0CHX2RDGX"),
            listing("bestbuy.com", "Apple - iPhone 15 Pro 128GB - Natural Titanium (Verizon)", 999.99, "https://bestbuy.com/site/apple-iphone-15-pro/6418599.p"),
            listing("bestbuy.com", "Apple iPhone 15 Pro 256GB - Blue Titanium (Unlocked)", 1099.99, "https://bestbuy.com/site/apple-iphone-15-pro-256/6418600.p"),
            listing("walmart.com", "Apple iPhone 15 Pro, 128GB, Natural Titanium - Unlocked", 999.00, "https://walmart.com/ip/Apple-iPhone-15-Pro/5085896321"),
            listing("walmart.com", "iPhone 15 Pro Max 256GB Blue Titanium - T-Mobile", 1199.00, "https://walmart.com/ip/iPhone-15-Pro-Max/5085896322"),
        ],
    ),
    (
        "macbook air m2",
        &[
            listing("amazon.com", "Apple 2022 MacBook Air Laptop with M2 chip: 13.6-inch Liquid Retina Display, 8GB RAM, 256GB SSD Storage", 1099.00, "https://amazon.com/dp/B0B3C2R8MP"),
            listing("amazon.com", "Apple MacBook Air 13-inch M2 Chip 8GB RAM 512GB SSD - Midnight", 1299.00, "https://amazon.com/dp/B0B3C57RQJ"),
            listing("bestbuy.com", "Apple - MacBook Air 13.6\" Laptop - Apple M2 chip - 8GB Memory - 256GB SSD - Starlight", 1099.99, "https://bestbuy.com/site/apple-macbook-air/6509650.p"),
            listing("bestbuy.com", "MacBook Air 13\" M2 Chip 8GB RAM 512GB SSD - Space Gray", 1299.99, "https://bestbuy.com/site/apple-macbook-air-512/6509651.p"),
            listing("walmart.com", "Apple MacBook Air 13.6-inch M2 Chip 8GB RAM 256GB SSD Silver", 1049.00, "https://walmart.com/ip/Apple-MacBook-Air-M2/1944190984"),
            listing("walmart.com", "Apple 2022 MacBook Air M2 Chip 8GB 512GB SSD 13.6\" Midnight", 1249.00, "https://walmart.com/ip/MacBook-Air-M2-512GB/1944190985"),
        ],
    ),
    (
        "airpods pro",
        &[
            listing("amazon.com", "Apple AirPods Pro (2nd Generation) Wireless Earbuds with MagSafe Case", 249.00, "https://amazon.com/dp/B0BDHWDR12"),
            listing("amazon.com", "Apple AirPods Pro 2nd Gen with USB-C Charging Case", 249.99, "https://amazon.com/dp/B0CHWRXH8B"),
            listing("bestbuy.com", "Apple - AirPods Pro (2nd generation) with MagSafe Case (USB‑C) - White", 249.99, "https://bestbuy.com/site/apple-airpods-pro/6418599.p"),
            listing("bestbuy.com", "Apple AirPods Pro 2nd Generation Wireless Earbuds - White", 229.99, "https://bestbuy.com/site/apple-airpods-pro-2nd/6418600.p"),
            listing("walmart.com", "Apple AirPods Pro (2nd Generation) with MagSafe Case USB-C", 239.00, "https://walmart.com/ip/Apple-AirPods-Pro-2nd/1486319416"),
            listing("walmart.com", "Apple AirPods Pro 2nd Gen Wireless Earbuds with USB-C Case", 249.00, "https://walmart.com/ip/AirPods-Pro-USB-C/1486319417"),
        ],
    ),
    (
        "nintendo switch",
        &[
            listing("amazon.com", "Nintendo Switch OLED Model w/ White Joy-Con", 349.99, "https://amazon.com/dp/B098RKWHHZ"),
            listing("amazon.com", "Nintendo Switch Console with Neon Blue and Neon Red Joy‑Con", 299.99, "https://amazon.com/dp/B07VGRJDFY"),
            listing("bestbuy.com", "Nintendo - Switch OLED Model with White Joy-Con", 349.99, "https://bestbuy.com/site/nintendo-switch-oled/6464255.p"),
            listing("bestbuy.com", "Nintendo Switch Console Neon Blue/Red Joy-Con", 299.99, "https://bestbuy.com/site/nintendo-switch/6364255.p"),
            listing("walmart.com", "Nintendo Switch OLED Model Gaming Console White", 349.00, "https://walmart.com/ip/Nintendo-Switch-OLED/606787621"),
            listing("walmart.com", "Nintendo Switch Console with Gray Joy‑Con Controllers", 299.88, "https://walmart.com/ip/Nintendo-Switch-Gray/606787622"),
        ],
    ),
];

// First match wins, so "headphones" must come before "phone".
const CATEGORY_PRICES: &[(&str, f64, f64)] = &[
    ("headphones", 50.0, 500.0),
    ("phone", 200.0, 1500.0),
    ("laptop", 400.0, 3000.0),
    ("tablet", 150.0, 1200.0),
    ("watch", 100.0, 800.0),
    ("camera", 300.0, 2000.0),
    ("speaker", 30.0, 400.0),
    ("keyboard", 20.0, 200.0),
    ("mouse", 15.0, 150.0),
    ("monitor", 150.0, 1000.0),
    ("tv", 200.0, 2000.0),
    ("gaming", 50.0, 600.0),
    ("book", 5.0, 50.0),
    ("clothes", 10.0, 200.0),
    ("shoes", 30.0, 300.0),
];
const DEFAULT_PRICE_RANGE: (f64, f64) = (25.0, 500.0);

const VARIATIONS: &[&str] = &[
    "Premium",
    "Pro",
    "Elite",
    "Ultra",
    "Max",
    "Plus",
    "Advanced",
    "Professional",
    "Deluxe",
    "Special Edition",
    "Limited Edition",
];
const COLORS: &[&str] = &["Black", "White", "Silver", "Blue", "Red", "Gray", "Gold"];
const SIZES: &[&str] = &["Compact", "Standard", "Large", "XL", "Mini"];

/// Stable pseudo-random stream seeded from the query, so the same query always
/// yields the same listings.
struct QueryRng(u64);

impl QueryRng {
    fn seeded(query: &str) -> Self {
        // FNV-1a
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for b in query.bytes() {
            hash ^= u64::from(b);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        Self(hash)
    }

    fn next_u64(&mut self) -> u64 {
        // splitmix64
        self.0 = self.0.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    }

    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        let unit = (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64;
        low + (high - low) * unit
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }

    fn range(&mut self, low: u64, high: u64) -> u64 {
        low + self.next_u64() % (high - low + 1)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn timestamp() -> String {
    chrono::Utc::now()
        .naive_utc()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}

/// A full key match beats a single shared word, so "airpods pro" does not
/// land on "iphone 15 pro". Words are compared whole: "chair" is not "air".
fn find_known(query_lower: &str) -> Option<&'static [Listing]> {
    let query_words: Vec<&str> = query_lower.split_whitespace().collect();
    KNOWN_PRODUCTS
        .iter()
        .find(|(key, _)| query_lower.contains(key))
        .or_else(|| {
            KNOWN_PRODUCTS.iter().find(|(key, _)| {
                key.split_whitespace()
                    .any(|word| query_words.contains(&word))
            })
        })
        .map(|(_, listings)| *listings)
}

fn known_products(listings: &[Listing]) -> Vec<Product> {
    let extracted_at = timestamp();
    listings
        .iter()
        .enumerate()
        .map(|(i, l)| {
            let id = i as i64 + 1;
            Product {
                id,
                site: l.site.to_string(),
                product_name: l.name.to_string(),
                price: Some(l.price),
                currency: "USD".to_string(),
                product_url: Some(l.url.to_string()),
                image_url: None,
                extracted_at: extracted_at.clone(),
                extraction_confidence: Some(0.88 + (id as f64 * 0.02) % 0.12),
            }
        })
        .collect()
}

fn generated_products(query: &str) -> Vec<Product> {
    let query_clean = query.trim();
    let query_lower = query_clean.to_lowercase();
    let mut rng = QueryRng::seeded(&query_lower);

    let (low, high) = CATEGORY_PRICES
        .iter()
        .find(|(category, _, _)| query_lower.contains(category))
        .map(|(_, low, high)| (*low, *high))
        .unwrap_or(DEFAULT_PRICE_RANGE);
    let slug = query_lower.replace(' ', "-").replace('&', "and");
    let extracted_at = timestamp();

    let mut products = Vec::with_capacity(SITES.len() * 2);
    let mut id = 1;
    for site in SITES {
        let (multiplier, suffix) = match site {
            "amazon.com" => (1.0, "Amazon's Choice"),
            "bestbuy.com" => (1.05, "Best Buy Exclusive"),
            _ => (0.95, "Great Value"),
        };
        for variant in 0..2 {
            let price = rng.uniform(low, high) * multiplier * rng.uniform(0.9, 1.1);
            let variation = rng.pick(VARIATIONS);
            let color = rng.pick(COLORS);
            let name = if variant == 0 {
                format!("{query_clean} - {variation} {color}")
            } else {
                let size = rng.pick(SIZES);
                format!("{query_clean} {variation} - {size} {color}")
            };
            let url = match site {
                "amazon.com" => format!(
                    "https://amazon.com/dp/{}{}",
                    rng.pick(&["B0", "B1"]),
                    rng.range(100_000, 999_999)
                ),
                "bestbuy.com" => format!(
                    "https://bestbuy.com/site/{slug}/{}.p",
                    rng.range(6_000_000, 6_999_999)
                ),
                _ => format!(
                    "https://walmart.com/ip/{slug}/{}",
                    rng.range(100_000_000, 999_999_999)
                ),
            };
            products.push(Product {
                id,
                site: site.to_string(),
                product_name: format!("{name} - {suffix}"),
                price: Some(round2(price)),
                currency: "USD".to_string(),
                product_url: Some(url),
                image_url: None,
                extracted_at: extracted_at.clone(),
                extraction_confidence: Some(round2(rng.uniform(0.85, 0.98))),
            });
            id += 1;
        }
    }
    products
}

/// Stand-in for the extraction backend: answers the search contract from a
/// fixed catalogue.
#[derive(Debug)]
pub struct Catalog {
    next_search_id: AtomicI64,
    latency: Duration,
}

impl Catalog {
    pub fn new(latency: Duration) -> Self {
        Self {
            next_search_id: AtomicI64::new(1),
            latency,
        }
    }

    pub fn lookup(&self, query: &str) -> Vec<Product> {
        let query_lower = query.trim().to_lowercase();
        match find_known(&query_lower) {
            Some(listings) => known_products(listings),
            None => generated_products(query),
        }
    }

    pub async fn search(&self, request: &SearchRequest) -> SearchResponse {
        let start = Instant::now();
        log::info!("Search request: {:?}", request.query);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let cap = request.max_results_per_site as usize;
        let mut per_site = [0usize; SITES.len()];
        let mut products: Vec<Product> = self
            .lookup(&request.query)
            .into_iter()
            .filter(|p| match SITES.iter().position(|s| *s == p.site) {
                Some(idx) => {
                    per_site[idx] += 1;
                    per_site[idx] <= cap
                }
                None => true,
            })
            .collect();
        products.sort_by(|a, b| a.price.unwrap_or(0.0).total_cmp(&b.price.unwrap_or(0.0)));

        let search_time_ms = start.elapsed().as_millis() as u64;
        let total_found = products.len() as u64;
        log::info!("Search completed: {total_found} products found in {search_time_ms}ms");

        SearchResponse {
            search_id: self.next_search_id.fetch_add(1, Ordering::SeqCst),
            query: request.query.clone(),
            status: SearchStatus::Completed,
            results: products,
            total_found,
            search_time_ms: Some(search_time_ms),
            sites_searched: SITES.iter().map(|s| s.to_string()).collect(),
            cached_results: 0,
            fresh_results: total_found,
            error_message: None,
        }
    }
}

#[test]
fn test_full_key_wins_over_shared_word() {
    let listings = find_known("apple airpods pro 2").unwrap();
    assert!(listings[0].name.contains("AirPods"));

    let listings = find_known("macbook").unwrap();
    assert!(listings[0].name.contains("MacBook"));

    // "pro" is shared with "iphone 15 pro", which comes first in the table
    let listings = find_known("macbook pro").unwrap();
    assert!(listings[0].name.contains("iPhone"));

    assert!(find_known("garden hose").is_none());
    assert!(find_known("office chair").is_none());
}

#[test]
fn test_generated_products_are_deterministic() {
    let first = generated_products("Mechanical Keyboard");
    let second = generated_products("Mechanical Keyboard");
    assert_eq!(first.len(), 6);
    for (a, b) in first.iter().zip(&second) {
        assert_eq!(a.product_name, b.product_name);
        assert_eq!(a.price, b.price);
        assert_eq!(a.product_url, b.product_url);
    }
    // keyboard range is 20..200, widened by the site multiplier and jitter
    for p in &first {
        let price = p.price.unwrap();
        assert!((20.0 * 0.95 * 0.9..=200.0 * 1.05 * 1.1).contains(&price));
        let confidence = p.extraction_confidence.unwrap();
        assert!((0.85..=0.98).contains(&confidence));
    }
}
