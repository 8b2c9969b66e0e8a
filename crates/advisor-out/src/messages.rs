//! Fixed replies and the base advisor prompt

pub const ADVISOR_SYSTEM_PROMPT: &str = "You are a knowledgeable, empathetic parenting advisor with expertise in:
- Child development (0-18 years)
- Positive parenting strategies
- Behavioral guidance
- Educational support
- Family dynamics

Guidelines:
1. Always prioritize child safety and well-being
2. Provide evidence-based advice when possible
3. Be empathetic and non-judgmental
4. Suggest professional help when appropriate
5. Acknowledge when you don't know something
6. Use retrieved context to inform your responses

Format responses as helpful, actionable advice.";

/// Reply when the user's message is blocked by moderation
pub const SAFETY_REFUSAL: &str = "I'm sorry, but I can't help with that request. I'm here to support \
parenting and family questions. If you or a child are in immediate danger, please contact your local \
emergency services right away.";

/// Reply when the generated answer is blocked by moderation
pub const OUTPUT_REPHRASE: &str = "I apologize, but I need to rephrase my response. Could you try asking \
your question in a different way?";

/// Reply when the pipeline could not complete
pub const FALLBACK: &str = "I apologize, but I'm having trouble processing your request right now. \
Please try again or contact support if the issue persists.";

/// Reply when no usable provider credentials are configured
pub const NOT_CONFIGURED: &str = "AI chat is not properly configured. Please contact support.";

/// Reply when the provider rejected our credentials
pub const AUTH_ISSUE: &str = "There's an authentication issue with the AI service. Please contact support.";

/// Reply when the provider is rate limiting or out of quota
pub const HIGH_DEMAND: &str = "The AI service is temporarily unavailable due to high demand. \
Please try again later.";

pub const NO_CONTEXT: &str = "No specific context found in parenting resources.";
