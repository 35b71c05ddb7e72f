//! French HTML template of the booking confirmation.

use crate::confirmation::BookingConfirmation;

/// Subject line: `Confirmation de réservation - {title}`.
#[must_use]
pub fn subject(confirmation: &BookingConfirmation) -> String {
    format!("Confirmation de réservation - {}", confirmation.event_title)
}

/// Render the HTML body.
///
/// Every user-supplied field is escaped.
#[must_use]
pub fn render_html(confirmation: &BookingConfirmation) -> String {
    let first_name = escape(&confirmation.first_name);
    let last_name = escape(&confirmation.last_name);
    let title = escape(&confirmation.event_title);
    let date = confirmation.formatted_date();
    let time = confirmation.formatted_time();
    let quantity = confirmation.quantity;
    let total = confirmation.formatted_total();

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>Confirmation de votre réservation</title>
</head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
        <h1>Confirmation de votre réservation</h1>
        <p>Bonjour {first_name} {last_name},</p>
        <p>Nous vous confirmons votre réservation pour l'événement "{title}".</p>

        <h2>Détails de la réservation :</h2>
        <ul>
            <li>Date : {date}</li>
            <li>Heure : {time}</li>
            <li>Nombre de billets : {quantity}</li>
            <li>Total : {total}</li>
        </ul>

        <h2>Informations pratiques :</h2>
        <ul>
            <li>Présentez ce mail ou une version imprimée à l'entrée</li>
            <li>Arrivez 15 minutes avant le début de l'événement</li>
            <li>L'adresse exacte vous sera communiquée quelques jours avant l'événement</li>
        </ul>

        <p>À très bientôt !</p>
        <p>L'équipe SoiréesEntrepreneurs</p>
    </div>
</body>
</html>
"#
    )
}

fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
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
