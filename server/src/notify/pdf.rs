use printpdf::{BuiltinFont, Color, Mm, PdfDocument, Rect, Rgb};
use qrcode::QrCode;

use super::NotificationError;
use crate::models::Ticket;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 18.0;
const QR_SIZE: f32 = 53.0;
const QR_QUIET_ZONE: usize = 4;

/// A4 ticket: title block, event, attendee, ticket id and a QR code whose
/// payload is the ticket id.
pub fn render_ticket_pdf(ticket: &Ticket, organizer: &str) -> Result<Vec<u8>, NotificationError> {
    let ticket_id = ticket.id.to_string();

    let (doc, page, layer) = PdfDocument::new(
        format!("Ticket {}", ticket_id),
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        "ticket",
    );
    let layer = doc.get_page(page).get_layer(layer);

    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| NotificationError::Render(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| NotificationError::Render(e.to_string()))?;

    layer.set_fill_color(Color::Rgb(Rgb::new(0.1, 0.1, 0.1, None)));
    layer.use_text("Event Ticket", 36.0, Mm(MARGIN), Mm(PAGE_HEIGHT - 25.0), &bold);
    layer.set_fill_color(Color::Rgb(Rgb::new(0.3, 0.3, 0.3, None)));
    layer.use_text(organizer, 18.0, Mm(MARGIN), Mm(PAGE_HEIGHT - 35.0), &regular);

    layer.set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
    let mut y = PAGE_HEIGHT - 65.0;
    for (label, value, size) in [
        ("EVENT:", ticket.event.as_str(), 16.0),
        ("ATTENDEE:", ticket.name.as_str(), 14.0),
        ("TICKET ID:", ticket_id.as_str(), 10.0),
    ] {
        layer.use_text(label, 12.0, Mm(MARGIN), Mm(y), &bold);
        layer.use_text(value, size, Mm(MARGIN), Mm(y - 7.0), &regular);
        y -= 21.0;
    }

    draw_qr(
        &layer,
        &ticket_id,
        PAGE_WIDTH - MARGIN - QR_SIZE,
        PAGE_HEIGHT - 25.0 - QR_SIZE,
    )?;

    doc.save_to_bytes()
        .map_err(|e| NotificationError::Render(e.to_string()))
}

/// Draws the code as filled squares with its lower-left corner at (x, y).
fn draw_qr(
    layer: &printpdf::PdfLayerReference,
    payload: &str,
    x: f32,
    y: f32,
) -> Result<(), NotificationError> {
    let code =
        QrCode::new(payload.as_bytes()).map_err(|e| NotificationError::Render(e.to_string()))?;
    let width = code.width();
    let module = QR_SIZE / (width + 2 * QR_QUIET_ZONE) as f32;
    let colors = code.to_colors();

    for (index, color) in colors.iter().enumerate() {
        if *color != qrcode::Color::Dark {
            continue;
        }
        let col = (index % width + QR_QUIET_ZONE) as f32;
        let row = (index / width + QR_QUIET_ZONE) as f32;
        let left = x + col * module;
        let top = y + QR_SIZE - row * module;
        layer.add_rect(Rect::new(Mm(left), Mm(top - module), Mm(left + module), Mm(top)));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TicketStatus;
    use uuid::Uuid;

    #[test]
    fn test_renders_a_pdf_document() {
        let ticket = Ticket {
            id: Uuid::now_v7(),
            transaction_id: Uuid::now_v7(),
            name: "Asha Rao".to_string(),
            email: "asha@example.com".to_string(),
            whatsapp_number: None,
            age_group: None,
            event: "InspireX".to_string(),
            status: TicketStatus::Confirmed,
            is_student: false,
            prn_number: None,
        };

        let bytes = render_ticket_pdf(&ticket, "Ticket Desk").unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 1000);
    }
}
