//! Terminal dashboard: Maestro Michi's speech bubble plus the analysis panels.

use artcat_core::models::{AnalysisStatus, ArtAnalysis, Mood};
use artcat_core::session::Session;
use colored::{ColoredString, Colorize};

const BAR_WIDTH: usize = 20;

/// What Maestro Michi says for the current state.
pub fn status_message(status: AnalysisStatus, commentary: Option<&str>) -> String {
    match status {
        AnalysisStatus::Idle => {
            "¡Miau! Sube tu obra. Estoy listo para criticar... digo, analizar tus trazos técnicos."
                .to_string()
        }
        AnalysisStatus::Analyzing => {
            "Mmm... observando la composición... olfateando los pigmentos... dame un momento."
                .to_string()
        }
        AnalysisStatus::Error => {
            "¡Sssss! Algo salió mal con la imagen. Intenta con otra, humano.".to_string()
        }
        AnalysisStatus::Complete => commentary
            .filter(|c| !c.trim().is_empty())
            .unwrap_or("Aquí está mi veredicto.")
            .to_string(),
    }
}

/// `█` for the filled share of `width`, `░` for the rest.
pub fn score_bar(score: f64, width: usize) -> String {
    let filled = ((score.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// `#rgb`, `#rrggbb` or `#rrggbbaa` to an RGB triple (alpha ignored).
pub fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#')?;
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match digits.len() {
        3 => {
            let mut it = digits.chars().map(|c| channel(&format!("{c}{c}")));
            Some((it.next()??, it.next()??, it.next()??))
        }
        6 | 8 => Some((
            channel(digits.get(0..2)?)?,
            channel(digits.get(2..4)?)?,
            channel(digits.get(4..6)?)?,
        )),
        _ => None,
    }
}

fn colored_score(score: f64, text: String) -> ColoredString {
    if score >= 80.0 {
        text.green()
    } else if score >= 60.0 {
        text.yellow()
    } else {
        text.red()
    }
}

/// Header shown on every state change.
pub fn print_header(session: &Session) {
    let mood = session.mood();
    let title = match mood {
        Mood::Stern => format!("😾 {}", mood.title()).red().bold(),
        Mood::Pleased => format!("😸 {}", mood.title()).green().bold(),
        Mood::Neutral => format!("🐱 {}", mood.title()).cyan().bold(),
    };
    let commentary = session.analysis().map(|a| a.cat_commentary.as_str());

    println!();
    println!("{title}");
    println!("  \"{}\"", status_message(session.status(), commentary).italic());
    if let Some(preview) = session.preview() {
        println!("  {} {}", "Obra:".dimmed(), preview.file_name.dimmed());
    }
    if session.status() == AnalysisStatus::Complete {
        let avg = session.average_score();
        println!(
            "  {} {}",
            "Nota Promedio:".white().bold(),
            colored_score(avg as f64, format!("{avg}/100")).bold()
        );
    }
    println!();
}

fn print_list(title: ColoredString, items: &[String], bullet: &str) {
    println!("{title}");
    if items.is_empty() {
        println!("  {}", "(nada)".dimmed());
    }
    for item in items {
        println!("  {bullet} {item}");
    }
    println!();
}

pub fn print_dashboard(analysis: &ArtAnalysis) {
    println!("{}", "Métricas Técnicas".white().bold());
    let width = analysis
        .technical_scores
        .iter()
        .map(|m| m.category.chars().count())
        .max()
        .unwrap_or(0);
    for metric in &analysis.technical_scores {
        println!(
            "  {:<width$}  {} {}",
            metric.category,
            colored_score(metric.score, score_bar(metric.score, BAR_WIDTH)),
            format!("{:>3}/{}", metric.score.round() as i64, metric.full_mark as i64).dimmed(),
        );
    }
    println!();

    println!("{}", "Paleta Detectada".white().bold());
    if analysis.color_palette.is_empty() {
        println!("  {}", "(nada)".dimmed());
    } else {
        let swatches: Vec<String> = analysis
            .color_palette
            .iter()
            .map(|hex| match parse_hex(hex) {
                Some((r, g, b)) => format!("{} {hex}", "   ".on_truecolor(r, g, b)),
                None => hex.clone(),
            })
            .collect();
        println!("  {}", swatches.join("  "));
    }
    println!();

    print_list("Patrones Detectados".white().bold(), &analysis.detected_patterns, "◆");
    print_list("Fortalezas Técnicas".green().bold(), &analysis.feedback.strengths, "✓");
    print_list("Áreas de Mejora".yellow().bold(), &analysis.feedback.improvements, "→");
    print_list("Consejos del Maestro".magenta().bold(), &analysis.feedback.tips, "💡");
}
