use chrono::{Datelike, NaiveDate};

const NO_NEWS_PLACEHOLDER: &str = "Tidak ditemukan berita relevan.";

const MONTHS_ID: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

/// Long Indonesian date, e.g. `19 Oktober 2026`.
pub fn format_date_id(date: NaiveDate) -> String {
    format!("{} {} {}", date.day(), MONTHS_ID[date.month0() as usize], date.year())
}

/// Build the text sent to the model: date context, news context, the
/// user's question and the answering rules.
pub fn compose_prompt(user_prompt: &str, news_text: &str, today: NaiveDate) -> String {
    let news = if news_text.trim().is_empty() {
        NO_NEWS_PLACEHOLDER
    } else {
        news_text
    };

    format!(
        r#"Tahun: {year}
Tanggal saat ini: {date}

Berita atau fakta tambahan (dari GNews):
{news}

Pertanyaan pengguna:
{user_prompt}

Instruksi:
- Jawablah dalam bahasa Indonesia yang baik dan jelas.
- Jika kamu memakai informasi dari berita di atas, cantumkan nomor referensinya seperti [1], [2], dst. sesuai urutan berita.
- Jangan mengarang fakta atau informasi yang tidak ada.
- Jika kamu tidak tahu jawabannya, katakan terus terang "Maaf, saya tidak tahu."
"#,
        year = today.year(),
        date = format_date_id(today),
    )
}
