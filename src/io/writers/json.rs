use crate::io::output::OutputWriter;
use crate::report::HealthReport;
use std::io::Write;

pub struct JsonWriter<W: Write> {
    writer: W,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> OutputWriter for JsonWriter<W> {
    fn write_report(&mut self, report: &HealthReport) -> anyhow::Result<()> {
        serde_json::to_writer_pretty(&mut self.writer, report)?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::CheckKind;
    use std::collections::BTreeMap;

    #[test]
    fn test_json_output_parses_back() {
        let mut report = HealthReport::new("r", "/data");
        report.set_health_score(BTreeMap::from([(CheckKind::Quality, 6)]));

        let mut buf = Vec::new();
        JsonWriter::new(&mut buf).write_report(&report).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["health_score"]["score"], 94);
        assert_eq!(value["health_score"]["penalties"]["quality"], 6);
    }
}
