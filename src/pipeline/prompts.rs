//! Prompt construction for the pipeline stages.
//!
//! Two fixed templates, rendered by pure functions of the schema and state.
//! The actual model calls live in the stage functions, not here.

use crate::config::DATA_TABLE;
use crate::dataset::SchemaInfo;
use crate::llm::Message;

/// System prompt template for SQL generation.
const SQL_GENERATION_TEMPLATE: &str = r#"You are a SQL expert. Generate a SQLite query to answer the user's question about the data.

Table name: {table}
Available columns: {columns}
Data types: {dtypes}

User question: {question}

Generate a single valid SQLite query against the {table} table that answers the question.
Return ONLY valid SQL in the sql_query field, without any markdown formatting or explanations."#;

/// System prompt template for answer generation.
const ANSWER_TEMPLATE: &str = r#"You are a data analyst. Based on the user's question and the SQL query results, provide a direct and concise answer.

User Question: {question}
SQL Query: {sql_query}
Query Results: {results}

Provide a straightforward answer that directly addresses the user's question.
Focus on the facts from the query results. Keep your response concise and to the point.
Do not include sections like "Key Insights", "Impact on Analysis", or "Actionable Recommendations".
Simply state what the data shows in response to the question."#;

/// Builds the SQL-generation prompt for a question.
pub fn sql_generation_messages(schema: &SchemaInfo, question: &str) -> Vec<Message> {
    let system = SQL_GENERATION_TEMPLATE
        .replace("{table}", DATA_TABLE)
        .replace("{columns}", &schema.format_columns())
        .replace("{dtypes}", &schema.format_types())
        .replace("{question}", question);

    vec![
        Message::system(system),
        Message::user(question.to_string()),
    ]
}

/// Builds the answer-generation prompt from the executed state.
pub fn answer_messages(question: &str, sql_query: &str, results: &str) -> Vec<Message> {
    let system = ANSWER_TEMPLATE
        .replace("{question}", question)
        .replace("{sql_query}", sql_query)
        .replace("{results}", results);

    vec![
        Message::system(system),
        Message::user("Provide your direct answer."),
    ]
}
