use std::path::PathBuf;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{Days, NaiveDate};
use futures_util::future::join_all;
use image::imageops::FilterType;
use image::RgbImage;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use txn_dashboard::types::{
    ChartKind, ConvertRequest, ConvertResponse, DatesRangeResponse, ErrorResponse, ImageResponse,
};

/// Smallest amount the converter accepts.
pub const MIN_CONVERT_AMOUNT: f64 = 0.001;

// ---------------------------------------------------------------------------
// App state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionStatus {
    Connected,
    Error(String),
    Connecting,
}

/// A decoded chart. The PNG is kept for saving.
#[derive(Debug, Clone)]
pub struct ChartImage {
    pub png: Vec<u8>,
    pub rgb: RgbImage,
}

#[derive(Debug, Clone)]
pub enum ChartSlot {
    Pending,
    Ready(ChartImage),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Browse,
    /// Converter prompt with the text typed so far.
    Convert(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

#[derive(Debug)]
pub struct AppState {
    pub base_url: String,
    pub out_dir: PathBuf,
    pub bounds: (NaiveDate, NaiveDate),
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub charts: Vec<(ChartKind, ChartSlot)>,
    pub status: ConnectionStatus,
    pub message: Option<StatusMessage>,
    pub mode: Mode,
    pub last_refresh: std::time::Instant,
}

impl AppState {
    /// Starts on the full dataset range.
    pub fn new(base_url: String, out_dir: PathBuf, bounds: (NaiveDate, NaiveDate)) -> Self {
        Self {
            base_url,
            out_dir,
            bounds,
            start: bounds.0,
            end: bounds.1,
            charts: ChartKind::ALL.iter().map(|&k| (k, ChartSlot::Pending)).collect(),
            status: ConnectionStatus::Connecting,
            message: None,
            mode: Mode::Browse,
            last_refresh: std::time::Instant::now(),
        }
    }

    /// Move the start date, staying within the bounds and not after the end.
    pub fn shift_start(&mut self, days: i64) {
        self.start = shift(self.start, days).clamp(self.bounds.0, self.end);
    }

    /// Move the end date, staying within the bounds and not before the start.
    pub fn shift_end(&mut self, days: i64) {
        self.end = shift(self.end, days).clamp(self.start, self.bounds.1);
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.message = Some(StatusMessage { text: text.into(), is_error: false });
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.message = Some(StatusMessage { text: text.into(), is_error: true });
    }

    /// Fetch every chart for the current range concurrently.
    pub async fn refresh(&mut self, client: &reqwest::Client) {
        for (_, slot) in &mut self.charts {
            *slot = ChartSlot::Pending;
        }

        let (start, end) = (self.start, self.end);
        let base_url = self.base_url.as_str();
        let results = join_all(
            self.charts
                .iter()
                .map(|(kind, _)| fetch_chart(client, base_url, *kind, start, end)),
        )
        .await;

        let mut first_error = None;
        let mut any_ok = false;
        for ((_, slot), result) in self.charts.iter_mut().zip(results) {
            *slot = match result {
                Ok(img) => {
                    any_ok = true;
                    ChartSlot::Ready(img)
                }
                Err(e) => {
                    first_error.get_or_insert_with(|| e.clone());
                    ChartSlot::Failed(e)
                }
            };
        }

        self.status = match (any_ok, first_error) {
            (false, Some(e)) => ConnectionStatus::Error(e),
            _ => ConnectionStatus::Connected,
        };
        self.last_refresh = std::time::Instant::now();
    }

    /// Submit converter input; the outcome goes to the status line.
    pub async fn convert(&mut self, client: &reqwest::Client, input: &str) {
        let (amount, code) = match parse_conversion(input) {
            Ok(v) => v,
            Err(e) => return self.error(e),
        };

        let url = format!("{}/convert_to_usd", self.base_url);
        let req = ConvertRequest { amount, from_currency: code.clone() };
        match client.post(&url).json(&req).send().await {
            Ok(resp) if resp.status().is_success() => match resp.json::<ConvertResponse>().await {
                Ok(r) => self.info(format!("{amount} {code} = {:.2} USD (rate {:.4})", r.amount_usd, r.rate)),
                Err(e) => self.error(format!("parse error: {e}")),
            },
            Ok(resp) => {
                let status = resp.status();
                let text = resp
                    .json::<ErrorResponse>()
                    .await
                    .map(|e| e.error)
                    .unwrap_or_else(|_| status.to_string());
                self.error(format!("Error: {text}"));
            }
            Err(e) => self.error(format!("Error: {e}")),
        }
    }

    /// Write the chart at `index` as `<endpoint>_<start>_<end>.png`.
    pub fn save_chart(&self, index: usize) -> Result<PathBuf, String> {
        let (kind, slot) = self.charts.get(index).ok_or("no chart selected")?;
        let ChartSlot::Ready(img) = slot else {
            return Err(format!("{} has no image to save", kind.heading()));
        };
        std::fs::create_dir_all(&self.out_dir).map_err(|e| e.to_string())?;
        let path = self
            .out_dir
            .join(format!("{}_{}_{}.png", kind.endpoint(), self.start, self.end));
        std::fs::write(&path, &img.png).map_err(|e| e.to_string())?;
        Ok(path)
    }
}

fn shift(date: NaiveDate, days: i64) -> NaiveDate {
    let step = Days::new(days.unsigned_abs());
    let moved = if days < 0 { date.checked_sub_days(step) } else { date.checked_add_days(step) };
    moved.unwrap_or(date)
}

// ---------------------------------------------------------------------------
// HTTP
// ---------------------------------------------------------------------------

/// Earliest and latest dates the service holds.
pub async fn fetch_bounds(
    client: &reqwest::Client,
    base_url: &str,
) -> Result<(NaiveDate, NaiveDate), String> {
    let url = format!("{base_url}/dates_range");
    let resp = client.get(&url).send().await.map_err(|e| e.to_string())?;
    if !resp.status().is_success() {
        return Err(format!("{url} returned {}", resp.status()));
    }
    let body: DatesRangeResponse = resp.json().await.map_err(|e| format!("parse error: {e}"))?;
    let parse = |s: &str| {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("bad date '{s}': {e}"))
    };
    Ok((parse(&body.min_date)?, parse(&body.max_date)?))
}

async fn fetch_chart(
    client: &reqwest::Client,
    base_url: &str,
    kind: ChartKind,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<ChartImage, String> {
    let url = format!("{base_url}{}", kind.path());
    let resp = client
        .get(&url)
        .query(&[("start_date", start.to_string()), ("end_date", end.to_string())])
        .send()
        .await
        .map_err(|e| e.to_string())?;

    if !resp.status().is_success() {
        let status = resp.status();
        return Err(resp
            .json::<ErrorResponse>()
            .await
            .map(|e| e.error)
            .unwrap_or_else(|_| format!("Failed to fetch image from {} ({status})", kind.endpoint())));
    }

    let body: ImageResponse = resp.json().await.map_err(|e| format!("parse error: {e}"))?;
    decode_chart(&body.image)
}

/// base64 → PNG → RGB.
pub fn decode_chart(b64: &str) -> Result<ChartImage, String> {
    let png = STANDARD.decode(b64).map_err(|e| format!("bad base64: {e}"))?;
    let rgb = image::load_from_memory(&png)
        .map_err(|e| format!("bad image: {e}"))?
        .to_rgb8();
    Ok(ChartImage { png, rgb })
}

// ---------------------------------------------------------------------------
// Input parsing
// ---------------------------------------------------------------------------

/// Parse `<amount> <CODE>` from the converter prompt.
pub fn parse_conversion(input: &str) -> Result<(f64, String), String> {
    let mut parts = input.split_whitespace();
    let (Some(amount), Some(code), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err("Enter an amount and a currency, e.g. 12.5 EUR".to_string());
    };

    let amount: f64 = amount
        .parse()
        .map_err(|_| format!("'{amount}' is not a number"))?;
    if !amount.is_finite() || amount < MIN_CONVERT_AMOUNT {
        return Err(format!("Amount must be at least {MIN_CONVERT_AMOUNT}"));
    }
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err("Please enter a valid currency code.".to_string());
    }
    Ok((amount, code.to_ascii_uppercase()))
}

// ---------------------------------------------------------------------------
// Preview
// ---------------------------------------------------------------------------

/// Half-block rendering of `img` scaled to fit `cols` × `rows` cells.
///
/// Each cell shows two vertically stacked pixels: the upper one as the
/// foreground of `▀`, the lower one as its background.
pub fn preview_lines(img: &RgbImage, cols: u16, rows: u16) -> Vec<Line<'static>> {
    let (iw, ih) = img.dimensions();
    if iw == 0 || ih == 0 || cols == 0 || rows == 0 {
        return Vec::new();
    }
    let scale = (cols as f64 / iw as f64).min(rows as f64 * 2.0 / ih as f64);
    let w = ((iw as f64 * scale).floor() as u32).max(1);
    let h = ((ih as f64 * scale).floor() as u32).max(2);
    let small = image::imageops::resize(img, w, h, FilterType::Triangle);

    (0..h / 2)
        .map(|y| {
            let spans: Vec<Span<'static>> = (0..w)
                .map(|x| {
                    let top = small.get_pixel(x, y * 2).0;
                    let bottom = small.get_pixel(x, y * 2 + 1).0;
                    Span::styled(
                        "▀",
                        Style::default()
                            .fg(Color::Rgb(top[0], top[1], top[2]))
                            .bg(Color::Rgb(bottom[0], bottom[1], bottom[2])),
                    )
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{head}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use txn_dashboard::api::{router, ApiState};
    use txn_dashboard::charts::{encode_png, to_base64, ChartRenderer};
    use txn_dashboard::dataset::Dataset;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn app() -> AppState {
        AppState::new(
            "http://127.0.0.1:9".to_string(),
            PathBuf::from("charts"),
            (d("2023-01-01"), d("2023-06-15")),
        )
    }

    #[test]
    fn starts_on_full_range() {
        let app = app();
        assert_eq!((app.start, app.end), (d("2023-01-01"), d("2023-06-15")));
        assert_eq!(app.charts.len(), ChartKind::ALL.len());
    }

    #[test]
    fn date_shifts_are_clamped() {
        let mut app = app();
        app.shift_start(-1);
        assert_eq!(app.start, d("2023-01-01"));
        app.shift_end(1);
        assert_eq!(app.end, d("2023-06-15"));

        app.shift_start(30);
        assert_eq!(app.start, d("2023-01-31"));
        app.shift_end(-365);
        assert_eq!(app.end, app.start);
        app.shift_start(1);
        assert_eq!(app.start, app.end);
    }

    #[test]
    fn conversion_input_is_validated() {
        assert_eq!(parse_conversion("10 eur"), Ok((10.0, "EUR".to_string())));
        assert_eq!(parse_conversion("  0.001   GBP "), Ok((0.001, "GBP".to_string())));
        assert!(parse_conversion("0.0005 EUR").is_err());
        assert!(parse_conversion("ten EUR").is_err());
        assert!(parse_conversion("10 EURO").is_err());
        assert!(parse_conversion("10").is_err());
        assert!(parse_conversion("10 EUR extra").is_err());
        assert!(parse_conversion("NaN EUR").is_err());
    }

    fn tiny_png() -> String {
        let rgb = [255u8, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255];
        to_base64(&encode_png(&rgb, 2, 2).unwrap())
    }

    #[test]
    fn decodes_base64_png() {
        let img = decode_chart(&tiny_png()).unwrap();
        assert_eq!(img.rgb.dimensions(), (2, 2));
        assert_eq!(img.rgb.get_pixel(0, 0).0, [255, 0, 0]);
        assert!(decode_chart("not base64!").is_err());
        assert!(decode_chart(&STANDARD.encode(b"not a png")).is_err());
    }

    #[test]
    fn preview_fits_the_area() {
        let img = RgbImage::from_pixel(100, 50, image::Rgb([10, 20, 30]));
        let lines = preview_lines(&img, 20, 20);
        // 100x50 scaled to width 20 keeps 2:1, so 10 pixel rows = 5 lines.
        assert_eq!(lines.len(), 5);
        assert!(lines.iter().all(|l| l.spans.len() == 20));
        assert!(preview_lines(&img, 0, 10).is_empty());
    }

    #[test]
    fn saving_requires_an_image() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app();
        app.out_dir = dir.path().join("out");
        assert!(app.save_chart(0).is_err());

        app.charts[0].1 = ChartSlot::Ready(decode_chart(&tiny_png()).unwrap());
        let path = app.save_chart(0).unwrap();
        assert!(path.ends_with("transactions_per_country_2023-01-01_2023-06-15.png"));
        assert!(std::fs::read(path).unwrap().starts_with(b"\x89PNG"));
    }

    async fn serve(csv: &str) -> String {
        let dataset = Dataset::from_reader(csv.as_bytes()).unwrap();
        let app = router(ApiState::new(dataset, ChartRenderer::new(160, 120, false), None));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    const CSV: &str = "timestamp,country,currency,merchant_category,amount,amount_usd\n\
        2023-01-01 10:00:00,Germany,EUR,Grocery,10,11\n\
        2023-02-01 10:00:00,Germany,XXX,Travel,5,\n\
        2023-06-15 22:00:00,Brazil,BRL,Retail,100,20\n";

    #[tokio::test]
    async fn fetches_bounds_and_every_chart() {
        let base_url = serve(CSV).await;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap();

        let bounds = fetch_bounds(&client, &base_url).await.unwrap();
        assert_eq!(bounds, (d("2023-01-01"), d("2023-06-15")));

        let mut app = AppState::new(base_url, PathBuf::from("charts"), bounds);
        app.refresh(&client).await;
        assert_eq!(app.status, ConnectionStatus::Connected);
        for (kind, slot) in &app.charts {
            assert!(matches!(slot, ChartSlot::Ready(_)), "{kind}");
        }

        app.convert(&client, "10 EUR").await;
        let msg = app.message.clone().unwrap();
        assert!(msg.is_error, "conversion is off on this server");
        assert!(msg.text.starts_with("Error: "));
    }

    #[tokio::test]
    async fn unreachable_service_fails_bounds() {
        let client = reqwest::Client::new();
        assert!(fetch_bounds(&client, "http://127.0.0.1:9").await.is_err());
    }
}
