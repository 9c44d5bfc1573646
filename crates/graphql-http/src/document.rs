use async_graphql_parser::{
    types::{DocumentOperations, ExecutableDocument, OperationDefinition, OperationType},
    Positioned,
};

use crate::GraphqlError;

/// Parses an executable GraphQL document.
pub fn parse(query: &str) -> Result<ExecutableDocument, GraphqlError> {
    async_graphql_parser::parse_query(query).map_err(GraphqlError::from)
}

/// Finds the operation a request refers to.
///
/// With a name, the operation with that name. Without one, the only operation of the document.
/// Returns `None` when the name is unknown or when the document has several operations and no
/// name was given: picking the operation is then the engine's problem to report.
pub fn get_operation<'a>(
    document: &'a ExecutableDocument,
    operation_name: Option<&str>,
) -> Option<&'a Positioned<OperationDefinition>> {
    match (&document.operations, operation_name) {
        (DocumentOperations::Single(operation), None) => Some(operation),
        (DocumentOperations::Single(_), Some(_)) => None,
        (DocumentOperations::Multiple(operations), Some(name)) => operations.get(name),
        (DocumentOperations::Multiple(operations), None) if operations.len() == 1 => operations.values().next(),
        (DocumentOperations::Multiple(_), None) => None,
    }
}

pub(crate) fn operation_type_name(ty: OperationType) -> &'static str {
    match ty {
        OperationType::Query => "query",
        OperationType::Mutation => "mutation",
        OperationType::Subscription => "subscription",
    }
}
