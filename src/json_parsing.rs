use{
    serde::{Serialize, de::DeserializeOwned},
    serde_json::Value,
    std::{fs::File, io::BufReader},
    crate::error::*,
};

/// Reads the options from the json file.
/// Without a file the default options are printed as an example and
/// the program exits.
pub fn parse<T>(file: Option<&String>) -> SirResult<(T, Value)>
where T: Default + Serialize + DeserializeOwned
{
    match file
    {
        None => {
            let example = T::default();
            serde_json::to_writer_pretty(std::io::stdout(), &example)?;
            println!();
            std::process::exit(0);
        },
        Some(path) => read_json(path)
    }
}

pub fn read_json<T: DeserializeOwned>(path: &str) -> SirResult<(T, Value)>
{
    let file = File::open(path)
        .map_err(|e| SirError::io(path, e))?;
    let json: Value = serde_json::from_reader(BufReader::new(file))?;
    let options = serde_json::from_value(json.clone())?;
    Ok((options, json))
}

#[cfg(test)]
mod tests
{
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
    struct Opts{
        trials: usize,
        beta: Option<f64>,
    }

    #[test]
    fn reads_options_and_keeps_the_json()
    {
        let path = std::env::temp_dir().join(format!("json_parsing_test_{}.json", std::process::id()));
        std::fs::write(&path, r#"{"trials": 12, "beta": null}"#).unwrap();
        let (opts, json): (Opts, Value) = read_json(path.to_str().unwrap()).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(opts, Opts{trials: 12, beta: None});
        assert_eq!(json["trials"], 12);
    }

    #[test]
    fn missing_file_is_an_io_error()
    {
        let res = read_json::<Opts>("/definitely/not/here.json");
        assert!(matches!(res, Err(SirError::Io{..})));
    }
}
