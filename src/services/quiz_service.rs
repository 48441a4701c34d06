// Quiz service - scam-awareness questions from the language model, with a
// built-in bank when the model is unavailable
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::services::providers::LanguageModel;

pub const DEFAULT_QUESTION_COUNT: usize = 5;
pub const MAX_QUESTION_COUNT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_index: usize,
    #[serde(default)]
    pub explanation: String,
}

impl QuizQuestion {
    fn is_well_formed(&self) -> bool {
        !self.question.trim().is_empty()
            && (2..=6).contains(&self.options.len())
            && self.options.iter().all(|o| !o.trim().is_empty())
            && self.correct_index < self.options.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizSource {
    Gemini,
    Builtin,
}

#[derive(Debug, Clone, Serialize)]
pub struct Quiz {
    pub source: QuizSource,
    pub questions: Vec<QuizQuestion>,
}

pub struct QuizService {
    llm: Option<Arc<dyn LanguageModel>>,
}

impl QuizService {
    pub fn new(llm: Option<Arc<dyn LanguageModel>>) -> Self {
        Self { llm }
    }

    pub async fn generate(&self, count: usize) -> Result<Quiz> {
        if !(1..=MAX_QUESTION_COUNT).contains(&count) {
            return Err(AppError::BadRequest(format!(
                "count must be between 1 and {}",
                MAX_QUESTION_COUNT
            )));
        }

        if let Some(llm) = &self.llm {
            match llm.generate(&quiz_prompt(count)).await {
                Ok(text) => match parse_questions(&text, count) {
                    Some(questions) => {
                        tracing::debug!(model = llm.name(), count, "Quiz generated");
                        return Ok(Quiz {
                            source: QuizSource::Gemini,
                            questions,
                        });
                    }
                    None => tracing::warn!(model = llm.name(), "Unusable quiz output, using built-in bank"),
                },
                Err(e) => tracing::warn!(model = llm.name(), error = %e, "Quiz generation failed, using built-in bank"),
            }
        }

        Ok(Quiz {
            source: QuizSource::Builtin,
            questions: builtin_questions(count),
        })
    }
}

fn quiz_prompt(count: usize) -> String {
    format!(
        "Create {} multiple-choice questions that teach people to recognize online scams \
         (phishing, fake shops, investment fraud, impersonation, job scams). \
         Answer with a JSON array only. Each element must have the fields \
         \"question\" (string), \"options\" (array of 4 strings), \
         \"correct_index\" (0-based integer) and \"explanation\" (one sentence).",
        count
    )
}

/// Pull the first JSON array out of the model's text, tolerating markdown
/// fences and surrounding prose. `None` unless `count` well-formed questions
/// are present.
fn parse_questions(text: &str, count: usize) -> Option<Vec<QuizQuestion>> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    if end <= start {
        return None;
    }

    let parsed: Vec<QuizQuestion> = serde_json::from_str(&text[start..=end]).ok()?;
    let questions: Vec<QuizQuestion> = parsed
        .into_iter()
        .filter(QuizQuestion::is_well_formed)
        .take(count)
        .collect();

    (questions.len() == count).then_some(questions)
}

fn builtin_questions(count: usize) -> Vec<QuizQuestion> {
    let bank = question_bank();
    let mut rng = rand::thread_rng();
    bank.choose_multiple(&mut rng, count.min(bank.len()))
        .cloned()
        .collect()
}

fn q(question: &str, options: [&str; 4], correct_index: usize, explanation: &str) -> QuizQuestion {
    QuizQuestion {
        question: question.to_string(),
        options: options.iter().map(|o| o.to_string()).collect(),
        correct_index,
        explanation: explanation.to_string(),
    }
}

fn question_bank() -> Vec<QuizQuestion> {
    vec![
        q(
            "Your bank texts you a link asking you to confirm your account within 24 hours. What should you do?",
            ["Click the link quickly", "Reply with your account number", "Call the bank using the number on its official website", "Forward it to friends"],
            2,
            "Banks never ask you to verify accounts through SMS links; contact them through official channels.",
        ),
        q(
            "Which URL is most likely a phishing site for paypal.com?",
            ["https://www.paypal.com/signin", "https://paypal.com.secure-login.xyz", "https://paypal.com/myaccount", "https://www.paypal.com/help"],
            1,
            "The real domain is the part right before the top-level domain; here it is secure-login.xyz.",
        ),
        q(
            "An online shop sells new phones at 70% off and only accepts bank transfers. This is most likely:",
            ["A seasonal sale", "A fake shop", "A wholesale outlet", "A loyalty reward"],
            1,
            "Unrealistic discounts combined with untraceable payment methods are classic fake-shop signs.",
        ),
        q(
            "Someone claiming to be police says you are under investigation and must transfer money to a 'safe account'. What is true?",
            ["Police can hold money in safe accounts", "You must comply immediately", "It is an impersonation scam", "You should send half now"],
            2,
            "Authorities never ask citizens to move money over the phone.",
        ),
        q(
            "An investment group promises guaranteed 30% monthly returns. What is the biggest red flag?",
            ["The group has many members", "Guaranteed high returns", "It uses a chat app", "It has a logo"],
            1,
            "No legitimate investment guarantees high returns; this is a hallmark of Ponzi schemes.",
        ),
        q(
            "You receive a message saying you won a prize but must pay a fee to claim it. You should:",
            ["Pay the fee", "Ignore and delete it", "Send your ID card photo", "Ask for a smaller fee"],
            1,
            "Real prizes do not require you to pay to receive them.",
        ),
        q(
            "A stranger asks for the OTP code that was just sent to your phone. What should you do?",
            ["Share it if they sound official", "Never share it", "Share only half of it", "Share it after they send theirs"],
            1,
            "One-time passwords authorize transactions; anyone asking for one is trying to take over your account.",
        ),
        q(
            "A job offer pays very well for simple 'like and share' tasks but first requires a deposit. This is:",
            ["A normal onboarding fee", "A task-based job scam", "A background check", "A training course"],
            1,
            "Legitimate employers pay you; they do not ask for deposits to start work.",
        ),
        q(
            "An online friend you have never met asks for money for an emergency. What is the safest response?",
            ["Send a small amount", "Verify through a video call and refuse to send money", "Send gift cards instead", "Borrow money to help"],
            1,
            "Romance scammers build trust over time and then invent emergencies.",
        ),
        q(
            "Which is the safest way to install a banking app?",
            ["From a link in an SMS", "From an APK sent over chat", "From the official app store", "From a pop-up ad"],
            2,
            "Apps from links or files can contain malware that steals credentials.",
        ),
        q(
            "What does the padlock icon in the browser address bar guarantee?",
            ["The site is trustworthy", "The connection is encrypted", "The site is government approved", "The site cannot be a scam"],
            1,
            "HTTPS only encrypts traffic; scam sites can have certificates too.",
        ),
        q(
            "A friend's account messages you asking to borrow money urgently. What should you do first?",
            ["Transfer immediately", "Call your friend on a known number to verify", "Ask for their bank details", "Share the message publicly"],
            1,
            "Hacked or cloned accounts are often used to ask contacts for money.",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::{ProviderError, ProviderResult};
    use async_trait::async_trait;

    struct ScriptedModel(String);

    #[async_trait]
    impl LanguageModel for ScriptedModel {
        async fn generate(&self, _prompt: &str) -> ProviderResult<String> {
            Ok(self.0.clone())
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    struct DownModel;

    #[async_trait]
    impl LanguageModel for DownModel {
        async fn generate(&self, _prompt: &str) -> ProviderResult<String> {
            Err(ProviderError::Status(500))
        }

        fn name(&self) -> &str {
            "down"
        }
    }

    const FENCED: &str = r#"Here is your quiz:
```json
[
  {"question": "Is a 'guaranteed profit' offer safe?", "options": ["Yes", "No"], "correct_index": 1, "explanation": "Nothing is guaranteed."},
  {"question": "Bad one", "options": ["Only"], "correct_index": 0},
  {"question": "Should you share OTP codes?", "options": ["Yes", "No", "Sometimes"], "correct_index": 1}
]
```"#;

    #[test]
    fn parses_fenced_json_and_drops_malformed_questions() {
        let questions = parse_questions(FENCED, 2).unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[1].correct_index, 1);
        assert!(questions[1].explanation.is_empty());
    }

    #[test]
    fn too_few_usable_questions_is_rejected() {
        assert!(parse_questions(FENCED, 3).is_none());
        assert!(parse_questions("I cannot help with that.", 1).is_none());
    }

    #[test]
    fn question_bank_is_well_formed() {
        let bank = question_bank();
        assert!(bank.len() >= MAX_QUESTION_COUNT);
        assert!(bank.iter().all(QuizQuestion::is_well_formed));
    }

    #[test]
    fn builtin_questions_are_distinct() {
        let picked = builtin_questions(MAX_QUESTION_COUNT);
        assert_eq!(picked.len(), MAX_QUESTION_COUNT);
        for (i, a) in picked.iter().enumerate() {
            assert!(picked[i + 1..].iter().all(|b| b.question != a.question));
        }
    }

    #[test]
    fn uses_model_output_when_usable() {
        let service = QuizService::new(Some(Arc::new(ScriptedModel(FENCED.to_string()))));
        let quiz = tokio_test::block_on(service.generate(2)).unwrap();
        assert_eq!(quiz.source, QuizSource::Gemini);
        assert_eq!(quiz.questions.len(), 2);
    }

    #[test]
    fn falls_back_to_builtin_bank() {
        let service = QuizService::new(Some(Arc::new(DownModel)));
        let quiz = tokio_test::block_on(service.generate(3)).unwrap();
        assert_eq!(quiz.source, QuizSource::Builtin);
        assert_eq!(quiz.questions.len(), 3);

        let service = QuizService::new(Some(Arc::new(ScriptedModel("not json".to_string()))));
        let quiz = tokio_test::block_on(service.generate(1)).unwrap();
        assert_eq!(quiz.source, QuizSource::Builtin);
    }

    #[test]
    fn rejects_out_of_range_counts() {
        let service = QuizService::new(None);
        assert!(matches!(
            tokio_test::block_on(service.generate(0)),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            tokio_test::block_on(service.generate(MAX_QUESTION_COUNT + 1)),
            Err(AppError::BadRequest(_))
        ));
    }
}
