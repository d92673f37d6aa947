use anyhow::{Context, Result, bail};
use glam::Vec2;
use glowgrid_input::{Command, ReconfigureRequest};

/// A command scheduled to run before the given tick.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptStep {
    pub tick: u64,
    pub command: Command,
}

/// Parse a comma-separated command timeline.
///
/// Each entry is `name@tick` with colon-separated arguments:
/// `press@10`, `release@40`, `click@12`, `move@5:0.5:-0.2`, `count@20:16`.
/// Steps come back sorted by tick; steps on the same tick keep their order.
pub fn parse(script: &str) -> Result<Vec<ScriptStep>> {
    let mut steps = Vec::new();
    for entry in script.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        steps.push(parse_step(entry).with_context(|| format!("bad script entry `{entry}`"))?);
    }
    steps.sort_by_key(|s| s.tick);
    Ok(steps)
}

fn parse_step(entry: &str) -> Result<ScriptStep> {
    let Some((name, rest)) = entry.split_once('@') else {
        bail!("expected `name@tick`");
    };
    let mut parts = rest.split(':');
    let tick: u64 = parts
        .next()
        .unwrap_or_default()
        .parse()
        .context("tick is not a whole number")?;
    let args: Vec<&str> = parts.collect();

    let command = match (name, args.as_slice()) {
        ("press", []) => Command::Press,
        ("release", []) => Command::Release,
        ("click", []) => Command::Click,
        ("move", [x, y]) => {
            let x: f32 = x.parse().context("x is not a number")?;
            let y: f32 = y.parse().context("y is not a number")?;
            Command::PointerMove(Vec2::new(x, y))
        }
        ("count", [n]) => {
            let n: i64 = n.parse().context("count is not a whole number")?;
            Command::Reconfigure(ReconfigureRequest::with_count(n))
        }
        ("press" | "release" | "click" | "move" | "count", _) => {
            bail!("wrong number of arguments for `{name}`")
        }
        _ => bail!("unknown command `{name}`"),
    };
    Ok(ScriptStep { tick, command })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_command() {
        let steps = parse("press@10, release@40,click@12,move@5:0.5:-0.2,count@20:16").unwrap();
        let ticks: Vec<u64> = steps.iter().map(|s| s.tick).collect();
        assert_eq!(ticks, vec![5, 10, 12, 20, 40]);
        assert_eq!(steps[0].command, Command::PointerMove(Vec2::new(0.5, -0.2)));
        assert_eq!(steps[1].command, Command::Press);
        assert_eq!(steps[2].command, Command::Click);
        assert_eq!(
            steps[3].command,
            Command::Reconfigure(ReconfigureRequest::with_count(16))
        );
        assert_eq!(steps[4].command, Command::Release);
    }

    #[test]
    fn same_tick_keeps_order() {
        let steps = parse("click@3,press@3").unwrap();
        assert_eq!(steps[0].command, Command::Click);
        assert_eq!(steps[1].command, Command::Press);
    }

    #[test]
    fn empty_script() {
        assert!(parse("").unwrap().is_empty());
    }

    #[test]
    fn rejects_malformed_entries() {
        assert!(parse("press").is_err());
        assert!(parse("jump@3").is_err());
        assert!(parse("click@x").is_err());
        assert!(parse("move@1:0.5").is_err());
        assert!(parse("press@1:2").is_err());
    }

    #[test]
    fn error_names_entry() {
        let err = parse("click@1,jump@3").unwrap_err();
        assert!(format!("{err:#}").contains("jump@3"));
    }
}
