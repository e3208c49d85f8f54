pub mod comment;
pub mod emitter;
pub mod error;
pub mod generator;
pub mod models;
pub mod naming;
pub mod parser;
pub mod schema;

pub use error::ConvertError;
pub use generator::{Conversion, Generator, ImportOptions};
pub use parser::DocumentFormat;

/// Convert a Postman collection (JSON text) into a `.http` script
pub fn convert_collection(input: &str) -> Result<String, ConvertError> {
    let collection = parser::parse_collection(input)?;
    Ok(Generator::new().convert_collection(&collection).script)
}

/// Convert an OpenAPI/Swagger document (JSON or YAML text) into a `.http` script
pub fn convert_openapi(input: &str, format: DocumentFormat) -> Result<String, ConvertError> {
    let document = parser::parse_openapi(input, format)?;
    Ok(Generator::new().convert_openapi(&document)?.script)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::tempdir;

    use crate::generator::Generator;
    use crate::parser::{load_collection, load_openapi};

    #[test]
    fn test_convert_collection_file() {
        // Create a temporary directory
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("users.postman_collection.json");

        // Write a sample collection export
        let mut file = File::create(&file_path).unwrap();
        write!(
            file,
            r#"{{
  "info": {{
    "_postman_id": "5f2c",
    "name": "Users",
    "schema": "https://schema.getpostman.com/json/collection/v2.1.0/collection.json"
  }},
  "variable": [{{"key": "host", "value": "example.com"}}],
  "item": [
    {{
      "id": "r1",
      "name": "Get",
      "request": {{
        "method": "GET",
        "url": {{
          "raw": "example.com/users/:id",
          "host": ["example", "com"],
          "path": ["users", ":id"],
          "variable": [{{"key": "id", "value": "17"}}]
        }}
      }}
    }},
    {{
      "id": "r2",
      "name": "Broken",
      "request": {{"method": "GET"}}
    }},
    {{
      "id": "r3",
      "name": "Get again",
      "request": {{
        "method": "GET",
        "url": {{
          "raw": "example.com/users/:id",
          "host": ["example", "com"],
          "path": ["users", ":id"],
          "variable": [{{"key": "id", "value": "18"}}]
        }}
      }}
    }}
  ]
}}"#
        )
        .unwrap();

        // Load and convert
        let collection = load_collection(&file_path).unwrap();
        let conversion = Generator::new().convert_collection(&collection);
        let script = conversion.script;

        // Verify the generated script
        assert!(script.lines().any(|line| line == "@host = example.com"));
        assert!(script.lines().any(|line| line == "@r1id = 17"));
        assert!(script.lines().any(|line| line == "@r3id = 18"));
        assert!(script
            .lines()
            .any(|line| line == "GET example.com/users/{{r1id}}/ HTTP/1.1"));
        assert!(script.ends_with("###\n"));
        assert!(!script.contains("Broken"));
        assert_eq!(conversion.skipped_items, 1);
        assert_eq!(conversion.variables.len(), 3);
    }

    #[test]
    fn test_convert_openapi_file_and_write_script() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("petstore.yaml");

        let mut file = File::create(&file_path).unwrap();
        writeln!(file, "openapi: 3.0.0").unwrap();
        writeln!(file, "info:").unwrap();
        writeln!(file, "  title: Petstore").unwrap();
        writeln!(file, "servers:").unwrap();
        writeln!(file, "  - url: http://localhost:8080").unwrap();
        writeln!(file, "paths:").unwrap();
        writeln!(file, "  /pets:").unwrap();
        writeln!(file, "    post:").unwrap();
        writeln!(file, "      summary: Add a pet").unwrap();
        writeln!(file, "      requestBody:").unwrap();
        writeln!(file, "        content:").unwrap();
        writeln!(file, "          application/json:").unwrap();
        writeln!(file, "            schema:").unwrap();
        writeln!(file, "              type: object").unwrap();
        writeln!(file, "              properties:").unwrap();
        writeln!(file, "                age:").unwrap();
        writeln!(file, "                  type: integer").unwrap();
        writeln!(file, "                  example: 3").unwrap();

        let document = load_openapi(&file_path, None).unwrap();
        let generator = Generator::new();
        let conversion = generator.convert_openapi(&document).unwrap();

        let output_path = dir.path().join("out").join("petstore.http");
        generator.write(&conversion, Some(output_path.as_path())).unwrap();

        let written = fs::read_to_string(&output_path).unwrap();
        assert_eq!(
            written,
            "### Petstore\n\
             \n\
             #POST Add a pet\n\
             POST http://localhost:8080/pets HTTP/1.1\n\
             Content-Type: application/json\n\
             \n\
             {\n  \"age\": 3\n}\n\
             \n\
             ###\n"
        );
    }

    #[test]
    fn test_string_entry_points() {
        let script = crate::convert_collection(r#"{"info": {"name": "Empty"}, "item": []}"#).unwrap();
        assert_eq!(script, "# Empty\n#\n# \n");

        let err = crate::convert_openapi(
            r##"{"openapi": "3.1.0", "info": {"title": "t"}, "paths": {"/a": {"post": {"requestBody": {"$ref": "#/components/requestBodies/Gone"}}}}}"##,
            crate::DocumentFormat::Json,
        )
        .unwrap_err();
        assert!(matches!(err, crate::ConvertError::UnresolvedReference(_)));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let dir = tempdir().unwrap();
        let err = load_collection(dir.path().join("absent.json")).unwrap_err();
        assert!(err.to_string().contains("absent.json"));
    }
}
