//! # Receipt Pipeline Tests
//!
//! Formatter, rasterizer and encoder behaviour seen from outside the crate.
//!
//! ## Test Coverage
//!
//! - **Wrapping**: every paper width, no overlong lines, no split words
//! - **Scenarios**: empty sale, VAT-exempt sale
//! - **Raster frames**: declared width and payload size for many widths

use blueslip::encoder;
use blueslip::printer::PaperWidth;
use blueslip::receipt::layout::{char_len, wrap};
use blueslip::receipt::{self, BusinessProfile, DiscountKind, Money, ReceiptDocument, Transaction};
use blueslip::render::raster::{DEFAULT_THRESHOLD, rasterize};
use image::{DynamicImage, Rgb, RgbImage};
use pretty_assertions::assert_eq;

const WIDTHS: [PaperWidth; 3] = [PaperWidth::Cols32, PaperWidth::Cols48, PaperWidth::Cols64];

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn business() -> BusinessProfile {
    BusinessProfile {
        name: "CORNER CAFE".into(),
        address: vec!["12 Main St".into(), "Springfield".into()],
        tax_id: Some("123-456-789".into()),
        ..Default::default()
    }
}

fn transaction(json: serde_json::Value) -> Transaction {
    let mut base = serde_json::json!({
        "id": "tx-100",
        "receipt_number": "000100",
        "created_at": "2026-04-11T18:45:00"
    });
    if let (Some(base), Some(extra)) = (base.as_object_mut(), json.as_object()) {
        base.extend(extra.clone());
    }
    serde_json::from_value(base).unwrap()
}

fn document(json: serde_json::Value) -> ReceiptDocument {
    ReceiptDocument::from_transaction(&transaction(json), &business(), None, None, None)
}

fn find_line<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    text.lines().find(|l| l.starts_with(prefix))
}

// ============================================================================
// WRAPPING
// ============================================================================

#[test]
fn test_wrapped_lines_fit_and_keep_words() {
    let inputs = [
        "",
        "Espresso",
        "A reasonably long sentence that will certainly need wrapping on narrow paper",
        "  indented text keeps going well past the edge of the smallest paper width we support",
        "tabs\tand   multiple   spaces   between   words   are   treated   as   breaks   here",
        "Ünïcödé wörds cöunt as öne cölumn each and shöuld wrap exactly like ascii wörds dö",
    ];

    for width in WIDTHS {
        let columns = width.columns();
        for input in inputs {
            let lines = wrap(input, columns);
            for line in &lines {
                assert!(char_len(line) <= columns, "{:?} wider than {}", line, columns);
            }
            let words_in: Vec<&str> = input.split_whitespace().collect();
            let words_out: Vec<&str> = lines.iter().flat_map(|l| l.split_whitespace()).collect();
            assert_eq!(words_out, words_in);
        }
    }
}

#[test]
fn test_formatted_receipt_fits_every_width() {
    let doc = document(serde_json::json!({
        "items": [
            {"name": "Seasonal pumpkin spice latte with oat milk and an extra shot", "quantity": 12, "unit_price": 99999,
             "modifiers": [{"name": "Whipped cream on top please", "price": 50}],
             "special_instructions": "Customer asked for the drink to be extra hot and with no lid at all"},
            {"name": "Water", "quantity": 1, "unit_price": 0}
        ],
        "subtotal": 1200588, "service_charge": 12000, "tax": 144070, "tip": 5000, "total": 1361658,
        "payments": [{"method": "Card", "amount": 1361658, "reference": "AUTH 0042 9911"}]
    }));

    for width in WIDTHS {
        let text = receipt::format(&doc, width);
        for line in text.lines() {
            assert!(
                char_len(line) <= width.columns(),
                "{:?} wider than {}",
                line,
                width.columns()
            );
        }
        let total = find_line(&text, "TOTAL").unwrap();
        assert_eq!(char_len(total), width.columns());
        assert!(total.ends_with("13,616.58"));
    }
}

// ============================================================================
// SCENARIOS
// ============================================================================

#[test]
fn test_empty_sale_still_prints() {
    let doc = document(serde_json::json!({}));
    let text = receipt::format(&doc, PaperWidth::Cols32);

    assert!(text.starts_with("          CORNER CAFE\n"));
    assert_eq!(
        find_line(&text, "Subtotal"),
        Some("Subtotal                    0.00")
    );
    assert_eq!(
        find_line(&text, "TOTAL"),
        Some("TOTAL                       0.00")
    );
    assert!(text.ends_with("           Thank you!\n"));

    let stream = encoder::encode(&text, None);
    assert_eq!(&stream.as_bytes()[..2], &[0x1B, 0x40]);
    assert!(stream.as_bytes().ends_with(&[0x1D, 0x56, 0x00]));
}

#[test]
fn test_exempt_discount_prints_marker_instead_of_tax() {
    let doc = document(serde_json::json!({
        "items": [{"name": "Pancit", "quantity": 2, "unit_price": 10000}],
        "subtotal": 20000,
        "discount": 4000,
        "discount_kind": "senior_citizen",
        "tax": 0,
        "total": 16000,
        "payments": [{"method": "Cash", "amount": 20000}]
    }));
    assert_eq!(doc.discount, Money::from_cents(4000));
    assert_eq!(doc.discount_kind, Some(DiscountKind::SeniorCitizen));

    let text = receipt::format(&doc, PaperWidth::Cols32);
    assert_eq!(
        find_line(&text, "Senior"),
        Some("Senior Citizen Disc.      -40.00")
    );
    assert!(text.contains("\n                      VAT-Exempt\n"));
    assert!(find_line(&text, "Tax").is_none());
    assert_eq!(
        find_line(&text, "Change"),
        Some("Change                     40.00")
    );
}

#[test]
fn test_regular_discount_is_not_exempt() {
    let doc = document(serde_json::json!({
        "subtotal": 20000, "discount": 4000, "discount_kind": "regular", "total": 16000
    }));
    let text = receipt::format(&doc, PaperWidth::Cols32);
    assert!(!text.contains("VAT-Exempt"));
    assert!(text.contains("\nDiscount "));
}

// ============================================================================
// RASTER FRAMES
// ============================================================================

#[test]
fn test_raster_frame_dimensions() {
    for width in 1..=70u32 {
        let height = 1 + width % 5;
        let image = DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            if (x + y) % 3 == 0 { Rgb([0, 0, 0]) } else { Rgb([255, 255, 255]) }
        }));
        let raster = rasterize(&image, 384, DEFAULT_THRESHOLD).unwrap();
        assert_eq!(raster.width as u32, width);

        let frame = raster.frame();
        let width_bytes = width.div_ceil(8) as usize;
        assert_eq!(&frame[..4], &[0x1D, 0x76, 0x30, 0x00]);
        assert_eq!(u16::from_le_bytes([frame[4], frame[5]]) as usize, width_bytes);
        assert_eq!(u16::from_le_bytes([frame[6], frame[7]]) as u32, height);
        assert_eq!(frame.len() - 8, width_bytes * height as usize);
    }
}

#[test]
fn test_wide_logo_is_scaled_to_paper() {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(1152, 200, Rgb([0, 0, 0])));
    let raster = rasterize(&image, PaperWidth::Cols48.logo_max_dots(), DEFAULT_THRESHOLD).unwrap();
    assert_eq!((raster.width, raster.height), (576, 100));
    assert!(raster.data.iter().all(|&b| b == 0xFF));
}

#[test]
fn test_logo_stream_is_centered_before_text() {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 1, Rgb([0, 0, 0])));
    let raster = rasterize(&image, 384, DEFAULT_THRESHOLD).unwrap();
    let stream = encoder::encode("hello\n", Some(&raster.frame()));
    let bytes = stream.as_bytes();

    let frame_at = bytes.windows(3).position(|w| w == [0x1D, 0x76, 0x30]).unwrap();
    assert_eq!(&bytes[frame_at - 3..frame_at], &[0x1B, 0x61, 0x01]);
    assert_eq!(&bytes[frame_at..frame_at + 9], &[0x1D, 0x76, 0x30, 0x00, 1, 0, 1, 0, 0xFF]);
    assert_eq!(&bytes[frame_at + 9..frame_at + 13], &[0x0A, 0x1B, 0x61, 0x00]);
    assert_eq!(&bytes[frame_at + 13..frame_at + 19], b"hello\n");
}
