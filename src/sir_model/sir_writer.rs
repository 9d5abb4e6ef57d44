use{
    std::{
        fs::File,
        io::{Write, BufWriter, stdout},
        path::Path,
    },
    serde_json::Value,
    super::*,
    crate::error::*,
};

/// Writes results either to stdout or, prefixed by the json
/// configuration, to a file
pub struct SirWriter
{
    writer: Box<dyn Write>,
    path: Option<String>,
}

impl SirWriter
{
    pub fn stdout() -> Self
    {
        Self{
            writer: Box::new(BufWriter::new(stdout())),
            path: None
        }
    }

    pub fn create<P: AsRef<Path>>(path: P, json: &Value) -> SirResult<Self>
    {
        let path = path.as_ref();
        log::info!("Creating: {}", path.display());
        let file = File::create(path)
            .map_err(|e| SirError::io(path, e))?;
        let mut res = Self{
            writer: Box::new(BufWriter::new(file)),
            path: Some(path.display().to_string())
        };
        write_json(&mut res.writer, json)
            .map_err(|e| res.io_error(e))?;
        Ok(res)
    }

    /// Stdout if no path is given
    pub fn new(path: Option<&String>, json: &Value) -> SirResult<Self>
    {
        match path {
            Some(path) => Self::create(path, json),
            None => Ok(Self::stdout())
        }
    }

    fn io_error(&self, source: std::io::Error) -> SirError
    {
        SirError::io(self.path.as_deref().unwrap_or("stdout"), source)
    }

    /// mean s, i, r and the dispersion of r
    pub fn write_endpoint(&mut self, mean: [f64; 3], dispersion: f64) -> SirResult<()>
    {
        let [s, i, r] = mean;
        writeln!(self.writer, "{s:.3}\t{i:.3}\t{r:.3}\t{dispersion:.3}")
            .map_err(|e| self.io_error(e))
    }

    pub fn write_curve(&mut self, curve: &SirCurve) -> SirResult<()>
    {
        for step in 0..curve.len()
        {
            writeln!(
                self.writer,
                "{:.3}\t{:.3}\t{:.3}",
                curve.s[step],
                curve.i[step],
                curve.r[step]
            ).map_err(|e| self.io_error(e))?;
        }
        Ok(())
    }

    pub fn finish(mut self) -> SirResult<()>
    {
        self.writer
            .flush()
            .map_err(|e| self.io_error(e))
    }
}

/// One `#` prefixed line with the configuration
pub fn write_json<W: Write>(mut writer: W, json: &Value) -> std::io::Result<()>
{
    write!(writer, "#")?;
    serde_json::to_writer(&mut writer, json)?;
    writeln!(writer)
}
