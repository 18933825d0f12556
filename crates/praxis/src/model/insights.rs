use super::LanguageModel;
use tracing::warn;

pub const SUMMARY_FALLBACK: &str = "Unable to generate summary";
pub const RECOMMENDATIONS_FALLBACK: &str = "Unable to generate recommendations";

/// Asks the model for a short narrative over already-rendered operational data.
pub fn summarize_data<M: LanguageModel + ?Sized>(model: &M, data: &str) -> String {
    let prompt = format!(
        "Analyze this operational data and provide key insights:\n\n\
         {data}\n\n\
         Focus on:\n\
         - Notable patterns or outliers\n\
         - Performance indicators\n\
         - Areas requiring attention\n\n\
         Keep summary under 150 words."
    );
    complete_or(model, &prompt, SUMMARY_FALLBACK)
}

/// Asks the model for three actionable recommendations following an analysis.
pub fn suggest_recommendations<M: LanguageModel + ?Sized>(
    model: &M,
    analysis: &str,
    context: &str,
) -> String {
    let prompt = format!(
        "Based on this analysis:\n\n\
         {analysis}\n\n\
         Context: {context}\n\n\
         Provide 3 specific, actionable recommendations for the operations team.\n\
         Format as numbered list, each recommendation in one sentence."
    );
    complete_or(model, &prompt, RECOMMENDATIONS_FALLBACK)
}

fn complete_or<M: LanguageModel + ?Sized>(model: &M, prompt: &str, fallback: &str) -> String {
    match model.complete(prompt, None) {
        Ok(completion) if !completion.text.trim().is_empty() => completion.text,
        Ok(_) => {
            warn!("model returned an empty completion");
            fallback.to_string()
        }
        Err(err) => {
            warn!(error = %err, "model call failed");
            fallback.to_string()
        }
    }
}
