// SPDX-License-Identifier: MPL-2.0

//! Kernel command-line module arguments.
//!
//! Arguments are whitespace-separated. A module argument is written
//! `module.key=value` or `module.flag`; everything else is ignored here.

/// An argument addressed to one module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleArg<'a> {
    /// `module.flag`
    Arg(&'a str),
    /// `module.key=value`
    KeyVal(&'a str, &'a str),
}

/// Returns the arguments on `cmdline` addressed to `module`, in order.
pub fn module_args<'a>(cmdline: &'a str, module: &'a str) -> impl Iterator<Item = ModuleArg<'a>> {
    cmdline.split_whitespace().filter_map(move |word| {
        let (name, rest) = word.split_once('.')?;
        if name != module || rest.is_empty() {
            return None;
        }
        Some(match rest.split_once('=') {
            Some((key, value)) => ModuleArg::KeyVal(key, value),
            None => ModuleArg::Arg(rest),
        })
    })
}

/// Returns the value of the last `module.key=value` on `cmdline`.
pub fn module_arg<'a>(cmdline: &'a str, module: &'a str, key: &str) -> Option<&'a str> {
    module_args(cmdline, module)
        .filter_map(|arg| match arg {
            ModuleArg::KeyVal(name, value) if name == key => Some(value),
            _ => None,
        })
        .last()
}

#[cfg(test)]
mod test {
    use alloc::vec::Vec;

    use super::*;

    #[test]
    fn module_args_are_split_by_module() {
        let cmdline = "console=ttyS0 pci.max_devices=16 logger.log_level=debug pci.quiet";
        let args: Vec<_> = module_args(cmdline, "pci").collect();
        assert_eq!(
            args,
            [ModuleArg::KeyVal("max_devices", "16"), ModuleArg::Arg("quiet")]
        );
        assert_eq!(module_arg(cmdline, "logger", "log_level"), Some("debug"));
    }

    #[test]
    fn later_values_override_earlier_ones() {
        let cmdline = "pci.multifunction=legacy pci.multifunction=function0";
        assert_eq!(module_arg(cmdline, "pci", "multifunction"), Some("function0"));
    }

    #[test]
    fn unrelated_words_are_ignored() {
        let cmdline = "init=/bin/sh pcix.max_devices=3 pci. .max_devices=2";
        assert_eq!(module_arg(cmdline, "pci", "max_devices"), None);
        assert_eq!(module_args(cmdline, "pci").count(), 0);
    }
}
