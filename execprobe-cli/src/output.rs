use std::io::Write;

use serde::Serialize;

use execprobe::Probe;

use crate::app::GlobalOptions;

/// The result record for `--json` output.
#[derive(Debug, Serialize)]
pub struct ProbeReport {
    pub mode: String,
    pub region: &'static str,
    pub returned: u64,
}

/// Announce which region is about to be executed.
///
/// Printed and flushed before the jump so the line is on screen even when
/// the probe dies on a fault; the fault handler's report then completes the
/// picture. JSON mode stays silent here and emits one record at the end.
pub fn announce(probe: Probe, opts: &GlobalOptions) -> anyhow::Result<()> {
    if !opts.json {
        print!("Executing machine code from '{}': ", probe.region());
        std::io::stdout().flush()?;
    }
    Ok(())
}

/// Report the value the payload returned.
pub fn report(probe: Probe, returned: u64, opts: &GlobalOptions) -> anyhow::Result<()> {
    if opts.json {
        let record = ProbeReport {
            mode: probe.to_string(),
            region: probe.region(),
            returned,
        };
        println!("{}", serde_json::to_string(&record)?);
    } else {
        println!("executed successfully ({returned}).");
    }
    Ok(())
}
