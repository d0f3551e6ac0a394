//! Slash command definitions for `post` and `deletepost`.

use super::types::{ApplicationCommand, Choice, CommandOptionDef, OPTION_BOOLEAN, OPTION_STRING};
use crate::posts::Category;
use crate::router::{
    CREATE_POST, DELETE_POST, OPT_CATEGORY, OPT_DESCRIPTION, OPT_IMAGE_URL, OPT_IS_NEW, OPT_TITLE,
};

fn option(kind: u8, name: &str, description: &str, required: bool) -> CommandOptionDef {
    CommandOptionDef {
        kind,
        name: name.to_string(),
        description: description.to_string(),
        required,
        choices: Vec::new(),
    }
}

/// All commands the bot registers.
pub fn definitions() -> Vec<ApplicationCommand> {
    let mut category = option(OPTION_STRING, OPT_CATEGORY, "Categoría del post", true);
    category.choices = Category::ALL
        .into_iter()
        .map(|c| Choice {
            name: c.label().to_string(),
            value: c.as_str().to_string(),
        })
        .collect();

    vec![
        ApplicationCommand {
            name: CREATE_POST.to_string(),
            description: "Crea una nueva publicación en la web de MasterStudio.".to_string(),
            // Required options must come first.
            options: vec![
                category,
                option(
                    OPTION_STRING,
                    OPT_TITLE,
                    "Título del post (ej: Nueva Dificultad Extrema)",
                    true,
                ),
                option(
                    OPTION_STRING,
                    OPT_DESCRIPTION,
                    "Descripción detallada del cambio o post",
                    true,
                ),
                option(
                    OPTION_STRING,
                    OPT_IMAGE_URL,
                    "URL de la imagen (debe ser permanente: Imgur, Discord CDN, etc.)",
                    true,
                ),
                option(
                    OPTION_BOOLEAN,
                    OPT_IS_NEW,
                    "Marca si este post debe tener la etiqueta 'NEW!'",
                    false,
                ),
            ],
        },
        ApplicationCommand {
            name: DELETE_POST.to_string(),
            description: "Elimina una publicación por su título exacto.".to_string(),
            options: vec![option(
                OPTION_STRING,
                OPT_TITLE,
                "El título EXACTO del post que quieres eliminar",
                true,
            )],
        },
    ]
}
