use chs_schema::{DocumentType, FieldDefinition, OptionList, PreviewRule};

pub fn strategist() -> DocumentType {
    DocumentType::new("strategist", "Strategist")
        .field(FieldDefinition::text("name").title("Name").required())
        .field(
            FieldDefinition::enumeration(
                "role",
                OptionList::new(&[
                    ("Principal Strategist", "principal"),
                    ("Academic Strategist", "academic"),
                    ("Community Strategist", "community"),
                    ("Competition Strategist", "competition"),
                ]),
            )
            .title("Role")
            .description(
                "Role identifier (e.g., \"principal\", \"academic\", \"community\", \"competition\")",
            )
            .required(),
        )
        .field(
            FieldDefinition::text("roleLabel")
                .title("Role Label")
                .description("Display label (e.g., \"Principal Strategist\")")
                .required(),
        )
        .field(FieldDefinition::image("photo", true).title("Photo"))
        .field(
            FieldDefinition::long_text("bio", 3)
                .title("Bio")
                .description("Optional short biography"),
        )
        .preview(
            PreviewRule::new()
                .select("title", "name")
                .select("subtitle", "roleLabel")
                .select("media", "photo"),
        )
}
