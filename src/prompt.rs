pub fn build_review_prompt(code: &str, language: &str) -> String {
    format!(
        "As an expert code reviewer, analyze this {language} code:\n\
         \n\
         {code}\n\
         \n\
         Provide a detailed review including:\n\
         1. Identify any errors (syntax, logical, or runtime)\n\
         2. If there are errors, provide the corrected code\n\
         \n\
         Format the response in a structured way."
    )
}
