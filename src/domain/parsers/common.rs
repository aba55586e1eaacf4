/*
Copyright 2024 San Francisco Compute Company

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

//! Common parsing utilities and helper functions

/// Parse a key-value pair from system output
///
/// # Arguments
/// * `line` - Line to parse (e.g., "Link layer: InfiniBand")
/// * `separator` - Separator character (usually ':')
///
/// # Returns
/// * `Ok((String, String))` - Key-value pair
/// * `Err(String)` - Parse error
pub fn parse_key_value(line: &str, separator: char) -> Result<(String, String), String> {
    if let Some(pos) = line.find(separator) {
        let key = line[..pos].trim().to_string();
        let value = line[pos + 1..].trim().to_string();
        Ok((key, value))
    } else {
        Err(format!("No separator '{separator}' found in line: {line}"))
    }
}

/// Trimmed, non-empty lines of command output
pub fn non_empty_lines(output: &str) -> impl Iterator<Item = &str> {
    output.lines().map(str::trim).filter(|line| !line.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_value() {
        let (key, value) = parse_key_value("\t\tLink layer: InfiniBand", ':').unwrap();
        assert_eq!(key, "Link layer");
        assert_eq!(value, "InfiniBand");
        assert!(parse_key_value("CA 'mlx5_0'", ':').is_err());
    }

    #[test]
    fn test_parse_key_value_splits_on_first_separator() {
        let (key, value) = parse_key_value("Port GUID: 0x0c42:a103", ':').unwrap();
        assert_eq!(key, "Port GUID");
        assert_eq!(value, "0x0c42:a103");
    }

    #[test]
    fn test_non_empty_lines() {
        let lines: Vec<&str> = non_empty_lines("mlx5_0\n\n  mlx5_1  \n").collect();
        assert_eq!(lines, vec!["mlx5_0", "mlx5_1"]);
    }
}
