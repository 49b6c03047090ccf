//! Receipt and sticker markup for a repair ticket, printed from the browser.
//!
//! Only reads tickets. The sticker carries a QR code pointing at the
//! ticket id so a scanned device can be looked up with `search`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use repairdesk_core::schema::format_date;
use repairdesk_core::{RepairTicket, StatusLabels};
use url::Url;

pub const DEFAULT_QR_SERVICE: &str = "https://api.qrserver.com/v1/create-qr-code/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopProfile {
    pub name: String,
    pub phone: String,
    pub currency: String,
    pub qr_service: String,
    pub rtl: bool,
}

impl Default for ShopProfile {
    fn default() -> Self {
        ShopProfile {
            name: "Repair Desk".into(),
            phone: String::new(),
            currency: "$".into(),
            qr_service: DEFAULT_QR_SERVICE.into(),
            rtl: false,
        }
    }
}

/// Text encoded in the sticker's QR code.
pub fn qr_payload(t: &RepairTicket) -> String {
    format!("ID_{}", t.id)
}

pub fn qr_image_url(t: &RepairTicket, shop: &ShopProfile) -> Result<Url, url::ParseError> {
    let mut u = Url::parse(&shop.qr_service)?;
    u.query_pairs_mut().append_pair("size", "80x80").append_pair("data", &qr_payload(t));
    Ok(u)
}

/// Inline `data:` URI for the device photo, typed by sniffing its bytes.
pub fn photo_data_uri(t: &RepairTicket) -> Option<String> {
    if !t.has_photo() {
        return None;
    }
    let mime = infer::get(&t.photo).map(|k| k.mime_type()).unwrap_or("application/octet-stream");
    Some(format!("data:{};base64,{}", mime, STANDARD.encode(&t.photo)))
}

pub fn receipt_html(t: &RepairTicket, shop: &ShopProfile, labels: &StatusLabels) -> String {
    let mut out = String::new();
    out.push_str("<div class=\"receipt-box\">\n");
    out.push_str(&format!("  <h2>{}</h2>\n", escape(&shop.name)));
    if !shop.phone.is_empty() {
        out.push_str(&format!("  <p class=\"center\">{}</p>\n", escape(&shop.phone)));
    }
    out.push_str("  <hr>\n");
    out.push_str(&format!(
        "  <p><b>Receipt no.:</b> {} | <b>Customer:</b> {}</p>\n",
        t.id,
        escape(&t.customer_name)
    ));
    if !t.phone.is_empty() {
        out.push_str(&format!("  <p><b>Phone:</b> {}</p>\n", escape(&t.phone)));
    }
    out.push_str(&format!("  <p><b>Device:</b> {}</p>\n", escape(&t.device())));
    out.push_str(&format!("  <p><b>Issue:</b> {}</p>\n", escape(&t.issue_description)));
    out.push_str(&format!("  <p><b>Amount:</b> {} {}</p>\n", t.agreed_cost, escape(&shop.currency)));
    out.push_str(&format!("  <p><b>Status:</b> {}</p>\n", escape(labels.label(t.status))));
    if t.created_date.is_some() {
        out.push_str(&format!("  <p><b>Date:</b> {}</p>\n", format_date(t.created_date)));
    }
    if let Some(src) = photo_data_uri(t) {
        out.push_str(&format!("  <img class=\"photo\" src=\"{src}\" alt=\"device photo\">\n"));
    }
    out.push_str("</div>\n");
    out
}

pub fn sticker_html(t: &RepairTicket, shop: &ShopProfile) -> String {
    let mut out = String::new();
    out.push_str("<div class=\"sticker-box\">\n");
    out.push_str(&format!("  <b class=\"name\">{}</b><br>\n", escape(&t.customer_name)));
    out.push_str(&format!("  <span class=\"model\">{}</span><br>\n", escape(&t.model)));
    // a bad service url in config only costs the image
    if let Ok(u) = qr_image_url(t, shop) {
        out.push_str(&format!("  <img src=\"{}\" width=\"70\" alt=\"{}\"><br>\n", escape(u.as_str()), escape(&qr_payload(t))));
    }
    out.push_str(&format!("  <b class=\"id\">ID: {}</b>\n", t.id));
    out.push_str("</div>\n");
    out
}

/// Standalone page with the receipt above the sticker; opens the print
/// dialog when loaded.
pub fn print_sheet(t: &RepairTicket, shop: &ShopProfile, labels: &StatusLabels) -> String {
    let dir = if shop.rtl { "rtl" } else { "ltr" };
    let align = if shop.rtl { "right" } else { "left" };
    format!(
        r#"<!DOCTYPE html>
<html dir="{dir}">
<head>
<meta charset="utf-8">
<title>{title} #{id}</title>
<style>
  body {{ font-family: sans-serif; text-align: {align}; }}
  .receipt-box {{ border: 2px solid black; padding: 15px; margin-bottom: 10px; }}
  .receipt-box h2, .center {{ text-align: center; margin: 0; }}
  .sticker-box {{ border: 1px solid black; padding: 5px; width: 200px; text-align: center; margin: 10px auto; }}
  .sticker-box .name {{ font-size: 14px; }}
  .sticker-box .model, .sticker-box .id {{ font-size: 12px; }}
  .photo {{ max-width: 160px; }}
  @media print {{ .no-print {{ display: none !important; }} }}
</style>
</head>
<body onload="window.print()">
{receipt}{sticker}<button class="no-print" onclick="window.print()">Print</button>
</body>
</html>
"#,
        dir = dir,
        align = align,
        title = escape(&shop.name),
        id = t.id,
        receipt = receipt_html(t, shop, labels),
        sticker = sticker_html(t, shop),
    )
}

fn escape(s: &str) -> String {
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

#[cfg(test)]
mod tests {
    use super::*;
    use repairdesk_core::TicketStatus;
    use rust_decimal_macros::dec;
    use time::macros::date;

    fn ticket() -> RepairTicket {
        RepairTicket {
            id: 1007,
            customer_name: "Ali <Ben>".into(),
            phone: "0916206100".into(),
            brand: "iPhone".into(),
            model: "11".into(),
            issue_description: "water & dust".into(),
            agreed_cost: dec!(45),
            parts_cost: dec!(0),
            status: TicketStatus::InRepair,
            created_date: Some(date!(2024-06-01)),
            photo: vec![],
        }
    }

    #[test]
    fn qr_link_encodes_ticket_id() {
        let u = qr_image_url(&ticket(), &ShopProfile::default()).unwrap();
        assert_eq!(u.as_str(), "https://api.qrserver.com/v1/create-qr-code/?size=80x80&data=ID_1007");
        let bad = ShopProfile { qr_service: "not a url".into(), ..Default::default() };
        assert!(qr_image_url(&ticket(), &bad).is_err());
        assert!(!sticker_html(&ticket(), &bad).contains("<img"));
    }

    #[test]
    fn receipt_escapes_and_labels() {
        let shop = ShopProfile { name: "Al-Hal Tech".into(), phone: "0916206100".into(), ..Default::default() };
        let labels = StatusLabels { in_repair: "تحت الصيانة".into(), delivered: "تم التسليم".into() };
        let html = receipt_html(&ticket(), &shop, &labels);
        assert!(html.contains("Ali &lt;Ben&gt;"));
        assert!(html.contains("water &amp; dust"));
        assert!(html.contains("<b>Amount:</b> 45 $"));
        assert!(html.contains("تحت الصيانة"));
        assert!(html.contains("iPhone 11"));
        assert!(html.contains("2024-06-01"));
        assert!(!html.contains("<img"));
    }

    #[test]
    fn photo_is_inlined_with_sniffed_type() {
        let mut t = ticket();
        t.photo = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
        let uri = photo_data_uri(&t).unwrap();
        assert!(uri.starts_with("data:image/png;base64,"));
        t.photo = vec![1, 2, 3];
        assert!(photo_data_uri(&t).unwrap().starts_with("data:application/octet-stream;base64,"));
        t.photo.clear();
        assert_eq!(photo_data_uri(&t), None);
    }

    #[test]
    fn sheet_has_both_blocks() {
        let shop = ShopProfile { rtl: true, ..Default::default() };
        let page = print_sheet(&ticket(), &shop, &StatusLabels::default());
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("dir=\"rtl\""));
        assert!(page.contains("class=\"receipt-box\""));
        assert!(page.contains("class=\"sticker-box\""));
        assert!(page.contains("ID: 1007"));
        assert!(page.contains("window.print()"));
    }
}
