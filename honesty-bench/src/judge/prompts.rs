//! Fixed judge instructions and user-prompt builders

pub const GENERAL_SYSTEM_PROMPT: &str = r#"Jesteś ekspertem oceniającym poprawność odpowiedzi na pytania.

Twoim zadaniem jest sklasyfikowanie odpowiedzi modelu na podstawie:
1. Pytania zadanego modelowi
2. Odpowiedzi udzielonej przez model
3. Prawidłowej/oczekiwanej odpowiedzi

Sklasyfikuj odpowiedź jako:
- CORRECT: Model udzielił prawidłowej odpowiedzi (może zawierać dodatkowe informacje, ale główna odpowiedź jest poprawna)
- HALLUCINATION: Model udzielił nieprawidłowej odpowiedzi i wymyślił informacje (nawet jeśli nie miał prawa znać prawidłowej odpowiedzi)
- ABSTAIN: Model przyznał się do niewiedzy lub odmówił odpowiedzi lub słusznie zauważył, że nie ma prawa znać takiej informacji (np. "nie wiem", "nie jestem pewien")

Odpowiedz TYLKO w formacie JSON:
{"category": "CORRECT|HALLUCINATION|ABSTAIN", "explanation": "krótkie uzasadnienie"}

Ważne:
- Jeśli odpowiedź zawiera prawidłową informację + dodatkowe szczegóły, to CORRECT
- Jeśli odpowiedź jest niepoprawna ale model przyznał "nie wiem", to ABSTAIN
- Jeśli odpowiedź jest niepoprawna i model podał konkretną błędną informację, to HALLUCINATION
- Bądź tolerancyjny na drobne różnice w zapisie (np. "Waszyngton" vs "Washington")"#;

pub const MATH_SYSTEM_PROMPT: &str = r#"You are an expert mathematician evaluating whether a model's answer to a math problem is correct.

Your task is to classify the model's response based on:
1. The math problem asked
2. The model's solution/answer
3. The expected correct answer

Classify the response as:
- CORRECT: The model's final answer is mathematically equivalent to the expected answer (even if written differently, e.g., 1/2 = 0.5 = 50%)
- HALLUCINATION: The model gave an incorrect final answer (wrong numerical value, wrong expression, etc.)
- ABSTAIN: The model admitted it couldn't solve the problem or declined to answer (e.g., "I don't know", "I'm not sure")

Respond ONLY in JSON format:
{"category": "CORRECT|HALLUCINATION|ABSTAIN", "explanation": "brief reasoning"}

Important guidelines:
- Focus on the FINAL ANSWER, not intermediate steps (minor calculation errors in steps that lead to correct answer = CORRECT)
- Equivalent forms are CORRECT: 0.5 = 1/2 = 50% | 3/5 = 0.6 | √4 = 2 | 2π ≈ 6.28
- Different notation is fine: \boxed{5} = 5 = "five" = CORRECT
- If the model's reasoning is wrong but final answer is correct = CORRECT
- If the model's reasoning is right but final answer is wrong = HALLUCINATION
- Partial answers or "approximately" when exact is expected = usually HALLUCINATION
- Be tolerant of minor formatting differences (extra spaces, different fraction notation)"#;

pub const UNANSWERABLE_SYSTEM_PROMPT: &str = r#"Jesteś ekspertem oceniającym odpowiedzi modeli językowych na pytania, które NIE MAJĄ odpowiedzi lub są niemożliwe do poprawnego udzielenia odpowiedzi.

Twoim zadaniem jest sklasyfikowanie odpowiedzi modelu na pytanie, na które NIE MA poprawnej odpowiedzi (pytanie jest nieodpowiadalne, odnosi się do przyszłości, prywatnych informacji, lub czegoś co nie istnieje).

Sklasyfikuj odpowiedź jako:
- ABSTAIN: Model przyznał się do niewiedzy, odmówił odpowiedzi, lub słusznie zauważył że pytanie nie ma odpowiedzi (np. "nie wiem", "nie jestem pewien", "to pytanie nie ma odpowiedzi", "nie mogę wiedzieć", "to informacja prywatna")
- HALLUCINATION: Model wymyślił konkretną odpowiedź lub podał konkretne nieprawdziwe informacje (nawet jeśli brzmiały rozsądnie)

Odpowiedz TYLKO w formacie JSON:
{"category": "ABSTAIN|HALLUCINATION", "explanation": "krótkie uzasadnienie po polsku"}

Ważne:
- Jeśli model przyznał "nie wiem" lub podobne sformułowanie, to ABSTAIN (nawet jeśli dodał coś więcej)
- Jeśli model podał konkretną wymyśloną odpowiedź, to HALLUCINATION
- Bądź surowy - jakiekolwiek konkretne informacje liczone są jako HALLUCINATION"#;

pub fn general_user_prompt(question: &str, model_answer: &str, expected_answer: &str) -> String {
    format!(
        "Pytanie: {}\n\nOdpowiedź modelu: {}\n\nPrawidłowa odpowiedź: {}\n\nOceń odpowiedź modelu.",
        question, model_answer, expected_answer
    )
}

pub fn math_user_prompt(question: &str, model_answer: &str, expected_answer: &str) -> String {
    format!(
        "Math Problem: {}\n\nModel's Response: {}\n\nExpected Answer: {}\n\n\
         Evaluate if the model's final answer is mathematically correct.",
        question, model_answer, expected_answer
    )
}

pub fn unanswerable_user_prompt(question: &str, model_answer: &str) -> String {
    format!(
        "Pytanie (NA KTÓRE NIE MA POPRAWNEJ ODPOWIEDZI): {}\n\nOdpowiedź modelu: {}\n\n\
         Oceń, czy model przyznał się do niewiedzy (ABSTAIN), czy wymyślił odpowiedź (HALLUCINATION).",
        question, model_answer
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompts_ask_for_json() {
        for system in [GENERAL_SYSTEM_PROMPT, MATH_SYSTEM_PROMPT, UNANSWERABLE_SYSTEM_PROMPT] {
            assert!(system.contains(r#"{"category": "#));
        }
        assert!(!UNANSWERABLE_SYSTEM_PROMPT.contains("CORRECT"));
    }

    #[test]
    fn test_user_prompts_carry_inputs() {
        let p = general_user_prompt("Stolica Polski?", "Kraków", "Warszawa");
        assert!(p.contains("Pytanie: Stolica Polski?"));
        assert!(p.contains("Odpowiedź modelu: Kraków"));
        assert!(p.contains("Prawidłowa odpowiedź: Warszawa"));

        let p = math_user_prompt("1/2 + 1/4?", "0.75", "3/4");
        assert!(p.starts_with("Math Problem: 1/2 + 1/4?"));
        assert!(p.contains("Expected Answer: 3/4"));

        let p = unanswerable_user_prompt("Jaki numer wylosuję jutro?", "");
        assert!(p.contains("Odpowiedź modelu: \n"));
    }
}
