/// Technical dimensions the critic is asked to score. Kept in the prompt order.
pub const TECHNICAL_DIMENSIONS: &[&str] = &[
    "Anatomía y Forma (si corresponde)",
    "Perspectiva y Profundidad",
    "Iluminación y Sombreado (Valores)",
    "Teoría del Color (Armonía, Saturación, Temperatura)",
    "Composición (Equilibrio, Puntos Focales, Movimiento Visual)",
    "Calidad de Línea (Peso, Confianza)",
];

/// Build the critic prompt sent alongside every image.
///
/// The wording is fixed: technique only, Maestro Michi persona, and all output in
/// Spanish regardless of the caller's locale.
pub fn build_critic_prompt() -> String {
    let dimensions = TECHNICAL_DIMENSIONS
        .iter()
        .enumerate()
        .map(|(i, d)| format!("{}. {d}", i + 1))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"Actúa como un Crítico de Arte Técnico e Instructor de clase mundial.
Tu personalidad es la de un "Gato Artista" altamente calificado, un poco serio pero alentador (Maestro Michi).

Analiza la imagen proporcionada específicamente por su ejecución técnica.
Ignora el contexto cultural o el significado del tema. Céntrate ÚNICAMENTE en:
{dimensions}

Identifica patrones visuales específicos utilizados (por ejemplo, formas recurrentes, técnicas de pincelada específicas).
Proporciona una paleta de colores hexadecimales de los colores dominantes.

IMPORTANTE: Todo el texto de salida (feedback, tips, comentarios del gato) DEBE estar en ESPAÑOL (Castellano).

Devuelve el resultado estrictamente en formato JSON según el esquema proporcionado."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_critic_prompt_lists_every_dimension() {
        let prompt = build_critic_prompt();
        for (i, dim) in TECHNICAL_DIMENSIONS.iter().enumerate() {
            assert!(prompt.contains(&format!("{}. {dim}", i + 1)), "missing {dim}");
        }
    }

    #[test]
    fn test_critic_prompt_demands_spanish_and_json() {
        let prompt = build_critic_prompt();
        assert!(prompt.contains("DEBE estar en ESPAÑOL"));
        assert!(prompt.contains("estrictamente en formato JSON"));
        assert!(prompt.contains("Ignora el contexto cultural"));
        assert!(prompt.contains("Maestro Michi"));
    }

    #[test]
    fn test_critic_prompt_is_stable() {
        assert_eq!(build_critic_prompt(), build_critic_prompt());
    }
}
