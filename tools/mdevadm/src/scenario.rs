//! Line-oriented scenario scripts for the simulation harness.
//!
//! One directive per line; `#` starts a comment, blank lines are skipped:
//!
//! ```text
//! attach <bb:dd.f> <vendor:device[:subvendor[:subdevice[:class]]]>
//! detach <bb:dd.f>
//! create <bb:dd.f> <type>
//! remove <instance-id>
//! describe <bb:dd.f> <type>
//! list
//! ```
//!
//! Malformed directives abort the run with a line-numbered error (scripts
//! are developer input). Errors returned by registry operations do not:
//! they are printed and the replay continues, since rejected operations are
//! the interesting output of a lifecycle simulation.

use std::io::Write;

use anyhow::{Context, Result, bail};
use mdev_core::{HotplugDispatcher, InstanceId, PciAddress, PciDeviceInfo, SharedRegistry};

/// One scenario directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Attach a physical device; binds it if an ID rule matches.
    Attach(PciDeviceInfo),
    /// Detach the device at an address, tearing down its instances.
    Detach(PciAddress),
    /// Create an instance of a type on a bound parent.
    Create(PciAddress, String),
    /// Remove a live instance by ID.
    Remove(InstanceId),
    /// Print the attribute files of one type.
    Describe(PciAddress, String),
    /// Print bound parents and live instances.
    List,
}

/// Parses a whole script, reporting the first malformed line.
pub fn parse(script: &str) -> Result<Vec<Directive>> {
    let mut directives = Vec::new();
    for (idx, line) in script.lines().enumerate() {
        let parsed =
            parse_line(line).with_context(|| format!("line {}: \"{}\"", idx + 1, line.trim()))?;
        if let Some(directive) = parsed {
            directives.push(directive);
        }
    }
    Ok(directives)
}

/// Parses one line; returns `None` for blank and comment lines.
fn parse_line(line: &str) -> Result<Option<Directive>> {
    let line = line.split('#').next().unwrap_or("").trim();
    let mut words = line.split_whitespace();
    let Some(keyword) = words.next() else {
        return Ok(None);
    };
    let rest: Vec<&str> = words.collect();

    let directive = match (keyword, rest.as_slice()) {
        ("attach", [addr, spec]) => Directive::Attach(parse_device(addr, spec)?),
        ("detach", [addr]) => Directive::Detach(parse_addr(addr)?),
        ("create", [addr, ty]) => Directive::Create(parse_addr(addr)?, (*ty).to_string()),
        ("remove", [id]) => {
            let raw: u64 = id.parse().with_context(|| format!("invalid instance id \"{id}\""))?;
            Directive::Remove(InstanceId::from_raw(raw))
        }
        ("describe", [addr, ty]) => Directive::Describe(parse_addr(addr)?, (*ty).to_string()),
        ("list", []) => Directive::List,
        _ => bail!("unknown or malformed directive"),
    };
    Ok(Some(directive))
}

fn parse_addr(s: &str) -> Result<PciAddress> {
    s.parse::<PciAddress>()
        .with_context(|| format!("invalid address \"{s}\""))
}

/// Parses an attached-device spec: `vendor:device[:subvendor[:subdevice[:class]]]`,
/// all hex, class being the 24-bit class code.
fn parse_device(addr: &str, spec: &str) -> Result<PciDeviceInfo> {
    let addr = parse_addr(addr)?;
    let fields: Vec<&str> = spec.split(':').collect();
    if fields.len() < 2 || fields.len() > 5 {
        bail!("device spec needs vendor:device[:subvendor[:subdevice[:class]]]");
    }
    let hex16 = |field: &str, what: &str| {
        u16::from_str_radix(field, 16).with_context(|| format!("invalid {what} \"{field}\""))
    };

    let mut info = PciDeviceInfo::new(addr, hex16(fields[0], "vendor id")?, hex16(fields[1], "device id")?);
    if let Some(field) = fields.get(2) {
        info.subsystem_vendor_id = hex16(field, "subvendor id")?;
    }
    if let Some(field) = fields.get(3) {
        info.subsystem_device_id = hex16(field, "subdevice id")?;
    }
    if let Some(field) = fields.get(4) {
        let class = u32::from_str_radix(field, 16)
            .ok()
            .filter(|class| *class <= 0x00FF_FFFF)
            .with_context(|| format!("invalid class code \"{field}\""))?;
        info.class = (class >> 16) as u8;
        info.subclass = (class >> 8) as u8;
        info.prog_if = class as u8;
    }
    Ok(info)
}

/// Replays parsed directives against the dispatcher and registry.
pub fn execute(
    dispatcher: &HotplugDispatcher,
    registry: &SharedRegistry,
    directives: &[Directive],
    out: &mut dyn Write,
) -> Result<()> {
    for directive in directives {
        match directive {
            Directive::Attach(info) => match dispatcher.device_attached(*info) {
                Ok(true) => writeln!(out, "attach {}: bound", info.address)?,
                Ok(false) => writeln!(out, "attach {}: no matching id", info.address)?,
                Err(e) => writeln!(out, "attach {}: error: {e}", info.address)?,
            },
            Directive::Detach(addr) => match dispatcher.device_detached(*addr) {
                Ok(true) => writeln!(out, "detach {addr}: unbound")?,
                Ok(false) => writeln!(out, "detach {addr}: not bound")?,
                Err(e) => writeln!(out, "detach {addr}: error: {e}")?,
            },
            Directive::Create(addr, ty) => match registry.write(|r| r.create_instance(*addr, ty)) {
                Ok(id) => writeln!(out, "create {addr} {ty}: instance {id}")?,
                Err(e) => writeln!(out, "create {addr} {ty}: error: {e}")?,
            },
            Directive::Remove(id) => match registry.write(|r| r.remove_instance(*id)) {
                Ok(()) => writeln!(out, "remove {id}: done")?,
                Err(e) => writeln!(out, "remove {id}: error: {e}")?,
            },
            Directive::Describe(addr, ty) => match registry.read(|r| r.describe_type(*addr, ty)) {
                Ok(status) => {
                    writeln!(out, "name: {}", status.name)?;
                    writeln!(out, "description: {}", status.description)?;
                    writeln!(out, "device_api: {}", status.device_api)?;
                    writeln!(out, "available_instances: {}", status.available_instances)?;
                }
                Err(e) => writeln!(out, "describe {addr} {ty}: error: {e}")?,
            },
            Directive::List => {
                let (parents, instances) =
                    registry.read(|r| (r.parents().copied().collect::<Vec<_>>(), r.instances()));
                for parent in parents {
                    writeln!(
                        out,
                        "parent {} [{:04x}:{:04x}]",
                        parent.address, parent.vendor_id, parent.device_id
                    )?;
                }
                for instance in instances {
                    writeln!(
                        out,
                        "instance {} type '{}' on {}",
                        instance.id, instance.type_name, instance.parent
                    )?;
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stub;

    #[test]
    fn parses_every_directive_form() {
        let script = "\
# comment line
attach 00:04.0 1af4:1000
attach 00:19.0 8086:100e:ffff:0:20000

create 00:04.0 0    # trailing comment
remove 3
describe 00:04.0 0
detach 00:04.0
list
";
        let directives = parse(script).unwrap();
        assert_eq!(directives.len(), 7);
        let Directive::Attach(info) = &directives[1] else {
            panic!("expected attach");
        };
        assert_eq!(info.subsystem_vendor_id, 0xffff);
        assert_eq!(info.class, 0x02);
        assert_eq!(directives[3], Directive::Remove(InstanceId::from_raw(3)));
        assert_eq!(directives[6], Directive::List);
    }

    #[test]
    fn malformed_line_is_reported_with_its_number() {
        let err = parse("list\nattach nope\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn rejects_unknown_keyword_and_bad_arity() {
        assert!(parse("frobnicate").is_err());
        assert!(parse("create 00:04.0").is_err());
        assert!(parse("list extra").is_err());
        assert!(parse("attach 00:04.0 1af4").is_err());
    }

    #[test]
    fn replay_continues_past_registry_errors() {
        let registry = mdev_core::SharedRegistry::new();
        let mut dispatcher = stub::dispatcher(registry.clone());
        dispatcher.add_id("1af4:1000".parse().unwrap());

        let directives = parse(
            "attach 00:04.0 1af4:1000\ncreate 00:04.0 0\ncreate 00:04.0 0\nremove 1\n",
        )
        .unwrap();
        let mut out = Vec::new();
        execute(&dispatcher, &registry, &directives, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("attach 00:04.0: bound"));
        assert!(text.contains("create 00:04.0 0: instance 1"));
        assert!(text.contains("create 00:04.0 0: error: no available instances for this type"));
        assert!(text.contains("remove 1: done"));
    }
}
