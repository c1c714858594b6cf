use crate::model::{field::FieldKind, index::IndexSchema};

/// Forum index: questions have answers and comments, answers have votes.
pub(crate) fn qa_schema() -> IndexSchema {
    IndexSchema::builder("forum")
        .field("title", FieldKind::Keyword)
        .field("votes", FieldKind::Long)
        .join_field(
            "join",
            [("question", vec!["answer", "comment"]), ("answer", vec!["vote"])],
        )
        .build()
        .expect("question/answer schema should build")
}

/// Same fields, no join declaration.
pub(crate) fn flat_schema() -> IndexSchema {
    IndexSchema::builder("flat")
        .field("title", FieldKind::Keyword)
        .build()
        .expect("flat schema should build")
}
