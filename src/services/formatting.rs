use crate::models::MovieResult;

/// Escapes text for Telegram's HTML parse mode
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Renders one movie as a chat message
pub fn format_movie_message(movie: &MovieResult, image_base_url: &str) -> String {
    let overview = movie
        .overview
        .as_deref()
        .unwrap_or("No overview available.");
    let release_date = movie
        .release_date
        .as_deref()
        .unwrap_or("Unknown Release Date");

    let mut message = format!("🎬 <b>{}</b>\n", escape_html(&movie.title));
    message.push_str(&format!(
        "📅 <b>Release Date:</b> {}\n",
        escape_html(release_date)
    ));
    message.push_str(&format!("📝 <b>Overview:</b> {}\n", escape_html(overview)));

    if let Some(poster_path) = &movie.poster_path {
        let poster_url = format!("{}{}", image_base_url.trim_end_matches('/'), poster_path);
        message.push_str(&format!(
            "🎞️ <a href=\"{}\">Poster</a>\n",
            escape_html(&poster_url)
        ));
    }

    message
}
