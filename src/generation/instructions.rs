//! Fixed instruction texts sent to the generation endpoints

/// System instruction constraining the text model to the pedagogical domain
///
/// Covers grade bands, BNCC skill codes, Markdown output and Brazilian
/// Portuguese.
pub const SYSTEM_INSTRUCTION: &str = "Você é um assistente pedagógico especializado na Educação Infantil, Ensino Fundamental I (do 1º ao 5º ano), EJA e Educação Especial. Sua missão é ajudar professores a criar materiais didáticos lúdicos, criativos e adequados.\n\nREGRA OBRIGATÓRIA: Todo o conteúdo gerado deve estar em total conformidade com a Base Nacional Comum Curricular (BNCC) do Brasil. Para planos de aula e atividades, você DEVE indicar os códigos das habilidades (ex: EF01LP01) e as competências desenvolvidas.\n\nUse linguagem simples, exemplos concretos e formatação Markdown clara. Responda sempre em Português do Brasil.";

/// Wrapper placed before the raw prompt for illustrations
pub const IMAGE_PROMPT_PREFIX: &str =
    "Crie uma ilustração educacional, colorida e didática, adequada para crianças, sobre o seguinte tema: ";

/// Sampling temperature for lesson text
pub const TEXT_TEMPERATURE: f32 = 0.7;

/// Build the single user message for the image model
pub fn image_prompt(prompt: &str) -> String {
    format!("{}{}", IMAGE_PROMPT_PREFIX, prompt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_instruction_mentions_domain_rules() {
        assert!(SYSTEM_INSTRUCTION.contains("BNCC"));
        assert!(SYSTEM_INSTRUCTION.contains("EF01LP01"));
        assert!(SYSTEM_INSTRUCTION.contains("Markdown"));
        assert!(SYSTEM_INSTRUCTION.contains("Português do Brasil"));
        assert!(SYSTEM_INSTRUCTION.contains("EJA"));
    }

    #[test]
    fn test_image_prompt_wraps_raw_prompt() {
        let wrapped = image_prompt("O Ciclo da Água");
        assert!(wrapped.starts_with(IMAGE_PROMPT_PREFIX));
        assert!(wrapped.ends_with("sobre o seguinte tema: O Ciclo da Água"));
    }
}
