//! Reads the model's recipe answer back into [`Recipe`] records.
//!
//! The model is asked for a bare JSON array but often wraps it in a fenced
//! block or surrounds it with prose. The array itself must parse strictly;
//! the fields inside each element are read leniently.

use serde_json::Value;

use crate::error::PipelineError;
use crate::model::Recipe;

const FENCE: &str = "```";
const RECIPE_COUNT: usize = 3;

/// Parse exactly three recipes out of raw model output.
///
/// # Errors
/// - [`PipelineError::MalformedRecipeData`] if the candidate text is not a JSON array
/// - [`PipelineError::InsufficientRecipes`] if the array holds fewer than three elements
pub fn parse(raw: &str) -> Result<[Recipe; 3], PipelineError> {
    let candidate = fenced_block(raw).unwrap_or(raw);

    let value: Value = serde_json::from_str(candidate.trim())
        .map_err(|e| PipelineError::MalformedRecipeData(e.to_string()))?;

    let elements = match value {
        Value::Array(elements) => elements,
        other => {
            return Err(PipelineError::MalformedRecipeData(format!(
                "expected a JSON array, found {}",
                json_type(&other)
            )))
        }
    };

    if elements.len() < RECIPE_COUNT {
        return Err(PipelineError::InsufficientRecipes {
            found: elements.len(),
        });
    }

    let recipes: Vec<Recipe> = elements
        .iter()
        .take(RECIPE_COUNT)
        .map(recipe_from_value)
        .collect();

    let found = recipes.len();
    recipes
        .try_into()
        .map_err(|_| PipelineError::InsufficientRecipes { found })
}

/// Interior of the first ```` ``` ```` fenced block, without an optional `json` tag.
/// An opening fence with no closing fence does not count as a block.
pub fn fenced_block(text: &str) -> Option<&str> {
    let start = text.find(FENCE)? + FENCE.len();
    let rest = &text[start..];
    let rest = match rest.get(..4) {
        Some(tag) if tag.eq_ignore_ascii_case("json") => &rest[4..],
        _ => rest,
    };
    let end = rest.find(FENCE)?;
    Some(rest[..end].trim())
}

fn recipe_from_value(value: &Value) -> Recipe {
    Recipe {
        name: text_field(value, "name"),
        ingredients: list_field(value, "ingredients"),
        instructions: list_field(value, "instructions"),
        cooking_time: text_field(value, "cookingTime"),
        servings: text_field(value, "servings"),
    }
}

fn text_field(value: &Value, key: &str) -> String {
    match &value[key] {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

fn list_field(value: &Value, key: &str) -> Vec<String> {
    match &value[key] {
        Value::Array(items) => items
            .iter()
            .filter_map(|i| i.as_str())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        // a single string where a list was asked for still carries content
        Value::String(s) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn recipe_json(name: &str) -> String {
        format!(
            r#"{{
                "name": "{name}",
                "ingredients": ["2 eggs", "1 onion"],
                "instructions": ["Chop the onion", "Fry everything"],
                "cookingTime": "20 minutes",
                "servings": "2 servings"
            }}"#
        )
    }

    fn recipes_array(names: &[&str]) -> String {
        let items: Vec<String> = names.iter().map(|n| recipe_json(n)).collect();
        format!("[{}]", items.join(","))
    }

    #[test]
    fn test_parse_bare_array() {
        let raw = recipes_array(&["Omelette", "Fried Rice", "Frittata"]);
        let recipes = parse(&raw).unwrap();

        let names: Vec<&str> = recipes.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Omelette", "Fried Rice", "Frittata"]);
        assert_eq!(recipes[0].ingredients, ["2 eggs", "1 onion"]);
        assert_eq!(recipes[0].instructions, ["Chop the onion", "Fry everything"]);
        assert_eq!(recipes[2].cooking_time, "20 minutes");
        assert_eq!(recipes[2].servings, "2 servings");
    }

    #[test]
    fn test_fenced_and_bare_parse_identically() {
        let bare = recipes_array(&["A", "B", "C"]);
        let expected = parse(&bare).unwrap();

        let wrappings = [
            format!("```json\n{bare}\n```"),
            format!("```\n{bare}\n```"),
            format!("Here are your recipes:\n\n```JSON\n{bare}\n```\nEnjoy!"),
            format!("```json{bare}```"),
        ];
        for wrapped in wrappings {
            assert_eq!(parse(&wrapped).unwrap(), expected, "input: {wrapped}");
        }
    }

    #[test]
    fn test_two_recipes_is_insufficient() {
        let err = parse(&recipes_array(&["A", "B"])).unwrap_err();
        assert!(matches!(err, PipelineError::InsufficientRecipes { found: 2 }));
    }

    #[test]
    fn test_empty_array_is_insufficient() {
        let err = parse("```json\n[]\n```").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientRecipes);
    }

    #[test]
    fn test_five_recipes_truncated_in_order() {
        let recipes = parse(&recipes_array(&["One", "Two", "Three", "Four", "Five"])).unwrap();
        let names: Vec<&str> = recipes.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["One", "Two", "Three"]);
    }

    #[test]
    fn test_prose_is_malformed() {
        let err = parse("I'm sorry, I can't identify any ingredients in this photo.").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedRecipeData);
    }

    #[test]
    fn test_prose_around_unfenced_array_is_malformed() {
        let raw = format!("Sure! {}", recipes_array(&["A", "B", "C"]));
        assert_eq!(parse(&raw).unwrap_err().kind(), ErrorKind::MalformedRecipeData);
    }

    #[test]
    fn test_object_instead_of_array_is_malformed() {
        let raw = format!(r#"{{"recipes": {}}}"#, recipes_array(&["A", "B", "C"]));
        let err = parse(&raw).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedRecipeData);
        assert!(err.to_string().contains("an object"));
    }

    #[test]
    fn test_missing_fields_are_tolerated() {
        let raw = r#"[
            {"name": "Only a name"},
            {"ingredients": ["rice"], "servings": 4},
            "not even an object"
        ]"#;
        let recipes = parse(raw).unwrap();

        assert_eq!(recipes[0].name, "Only a name");
        assert!(recipes[0].ingredients.is_empty());
        assert!(recipes[0].cooking_time.is_empty());
        assert_eq!(recipes[1].name, "");
        assert_eq!(recipes[1].ingredients, ["rice"]);
        assert_eq!(recipes[1].servings, "4");
        assert_eq!(recipes[2], Recipe::default());
    }

    #[test]
    fn test_non_string_list_items_are_skipped() {
        let raw = r#"[
            {"name": "A", "ingredients": ["salt", 3, null, "  ", "pepper"], "instructions": "Mix well"},
            {"name": "B"},
            {"name": "C"}
        ]"#;
        let recipes = parse(raw).unwrap();
        assert_eq!(recipes[0].ingredients, ["salt", "pepper"]);
        assert_eq!(recipes[0].instructions, ["Mix well"]);
    }

    #[test]
    fn test_fenced_block_requires_closing_fence() {
        assert_eq!(fenced_block("```json\n[1, 2]"), None);
        assert_eq!(fenced_block("no fences here"), None);
        assert_eq!(fenced_block("a ```json\n[1]\n``` b ```[2]```"), Some("[1]"));
    }
}
