use std::path::Path;

use anyhow::Result;
use artcat_core::analysis;
use artcat_core::encode;
use artcat_core::models::{AnalysisStatus, PreviewHandle};
use artcat_core::session::Session;
use chrono::Utc;
use colored::Colorize;

use super::{GENERIC_FAILURE, backend_for_request, load_config};
use crate::render;

pub fn run(image: &Path, json: bool, model: Option<String>) -> Result<()> {
    if !encode::is_image_path(image) {
        anyhow::bail!(
            "{} no es una imagen. Formatos: {}.",
            image.display(),
            encode::supported_formats()
        );
    }

    let config = load_config(model)?;
    let mut session = Session::new();
    let ticket = session.select(PreviewHandle::for_path(image))?;

    if !json {
        render::print_header(&session);
    }

    let outcome = backend_for_request(&config)
        .and_then(|backend| analysis::analyze_file(&*backend, image));
    session.resolve(ticket, outcome);

    match (session.status(), session.analysis()) {
        (AnalysisStatus::Complete, Some(analysis)) => {
            if json {
                let out = serde_json::json!({
                    "analyzedAt": Utc::now().to_rfc3339(),
                    "model": config.ai.model,
                    "averageScore": session.average_score(),
                    "analysis": analysis,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                render::print_header(&session);
                render::print_dashboard(analysis);
            }
            Ok(())
        }
        _ => {
            if !json {
                render::print_header(&session);
                eprintln!("{}", "Error en el análisis".red().bold());
            }
            anyhow::bail!(GENERIC_FAILURE)
        }
    }
}
