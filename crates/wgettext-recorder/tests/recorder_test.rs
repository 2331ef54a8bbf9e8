//! Integration tests for wgettext-recorder
//!
//! These drive the recorder against a real output file, the way the shim does,
//! and read the result back through the PO reader.

use std::io::Write;

use tempfile::tempdir;
use wgettext_config::WatchConfig;
use wgettext_recorder::sink::write_header;
use wgettext_recorder::testing::{parse_stanzas, FixedStack};
use wgettext_recorder::{Lookup, PoSink, Recorder};

fn dcgettext<'a>(msgid: &'a [u8], translated: &'a [u8]) -> Lookup<'a> {
    Lookup {
        func: "dcgettext",
        domain: Some(b"app"),
        msgid,
        msgid_plural: None,
        translated,
        handle: msgid.as_ptr() as usize,
    }
}

fn recorder() -> Recorder<Vec<u8>, FixedStack> {
    Recorder::new(Vec::new(), FixedStack::new(["caller+0x10 [0x4010]"]))
}

/// Scenario: one unique call, no context, no newline
#[test]
fn test_single_lookup() {
    let mut rec = recorder();
    let r = rec.record(&dcgettext(b"Hello", b"Bonjour"));
    assert_eq!(r.tagged(), b"[1]Bonjour");

    let stanzas = parse_stanzas(rec.writer());
    assert_eq!(stanzas.len(), 1);
    assert_eq!(stanzas[0].refno, 1);
    assert_eq!(stanzas[0].func, "dcgettext");
    assert_eq!(stanzas[0].msgid, b"Hello");
    assert_eq!(stanzas[0].msgstr, b"Bonjour");
    assert_eq!(stanzas[0].frames, vec!["caller+0x10 [0x4010]".to_string()]);
}

/// Scenario: duplicate call yields the same tag and a single stanza
#[test]
fn test_duplicate_lookup() {
    let mut rec = recorder();
    let first = rec.record(&dcgettext(b"Hello", b"Bonjour"));
    let second = rec.record(&dcgettext(b"Hello", b"Bonjour"));
    assert_eq!(first.tagged(), b"[1]Bonjour");
    assert_eq!(second.tagged(), b"[1]Bonjour");
    assert_eq!(parse_stanzas(rec.writer()).len(), 1);
}

/// Scenario: newline in msgid
#[test]
fn test_multiline_msgid() {
    let mut rec = recorder();
    let r = rec.record(&dcgettext(b"Line1\nLine2", b"L1\nL2"));
    assert_eq!(r.tagged(), b"[1]L1\nL2");

    let out = String::from_utf8(rec.writer().clone()).unwrap();
    assert!(out.contains("msgid \"\"\n\"Line1\\n\"\n\"Line2\"\n"));
    assert!(out.contains("msgstr \"\"\n\"L1\\n\"\n\"L2\"\n"));
}

/// Scenario: context prefix
#[test]
fn test_context_lookup() {
    let mut rec = recorder();
    let r = rec.record(&dcgettext(b"menu\x04File", b"menu\x04Fichier"));
    assert_eq!(r.tagged(), b"[1]Fichier");

    let stanzas = parse_stanzas(rec.writer());
    assert_eq!(stanzas[0].msgctxt.as_deref(), Some(&b"menu"[..]));
    assert_eq!(stanzas[0].msgid, b"File");
    assert_eq!(stanzas[0].msgstr, b"Fichier");
}

/// Scenario: plural form
#[test]
fn test_plural_lookup() {
    let mut rec = recorder();
    let r = rec.record(&Lookup {
        func: "dcngettext",
        msgid_plural: Some(b"%d apples"),
        ..dcgettext(b"one apple", b"3 pommes")
    });
    assert_eq!(r.tagged(), b"[1]3 pommes");

    let stanzas = parse_stanzas(rec.writer());
    assert_eq!(stanzas[0].func, "dcngettext");
    assert_eq!(stanzas[0].msgid, b"one apple");
    assert_eq!(stanzas[0].msgid_plural.as_deref(), Some(&b"%d apples"[..]));
    assert_eq!(stanzas[0].msgstr_keyword, "msgstr[FIXME]");
    assert_eq!(stanzas[0].msgstr, b"3 pommes");
}

/// Scenario: escape variety survives a round trip
#[test]
fn test_escape_round_trip() {
    let nasty: &[&[u8]] = &[
        b"\"quote\" and\\backslash",
        b"tab\there\r\x0cfeed",
        b"trailing newline\n",
        b"\n\nleading newlines",
        b"",
        "ünïcödé \"ok\"".as_bytes(),
    ];
    let mut rec = recorder();
    for msgid in nasty {
        rec.record(&dcgettext(msgid, b"x"));
    }

    let stanzas = parse_stanzas(rec.writer());
    assert_eq!(stanzas.len(), nasty.len());
    for (stanza, original) in stanzas.iter().zip(nasty) {
        assert_eq!(&stanza.msgid[..], *original);
    }
}

/// Refs are exactly 1..=K for K distinct messages, in first-sighting order
#[test]
fn test_refs_dense_over_mixed_trace() {
    let trace: &[&[u8]] = &[
        b"a", b"b", b"a", b"ctx\x04a", b"c", b"b", b"a", b"d", b"ctx\x04a",
    ];
    let mut rec = recorder();
    let tags: Vec<u32> = trace
        .iter()
        .map(|m| rec.record(&dcgettext(m, b"t")).refno)
        .collect();
    assert_eq!(tags, vec![1, 2, 1, 3, 4, 2, 1, 5, 3]);

    let refs: Vec<u32> = parse_stanzas(rec.writer()).iter().map(|s| s.refno).collect();
    assert_eq!(refs, vec![1, 2, 3, 4, 5]);
    assert_eq!(rec.messages(), 5);
    assert_eq!(rec.calls(), trace.len() as u64);
}

/// The tag on a first sighting is the ref written into its stanza
#[test]
fn test_first_tag_matches_stanza_ref() {
    let mut rec = recorder();
    rec.record(&dcgettext(b"one", b"eins"));
    let r = rec.record(&dcgettext(b"two", b"zwei"));
    assert!(r.inserted);

    let stanzas = parse_stanzas(rec.writer());
    let stanza = stanzas.iter().find(|s| s.msgid == b"two").unwrap();
    assert_eq!(stanza.refno, r.refno);
    assert_eq!(r.tagged(), b"[2]zwei");
}

/// Same input trace produces the same bytes
#[test]
fn test_output_is_deterministic() {
    let run = || {
        let inputs: [(&[u8], &[u8]); 4] = [
            (b"a", b"A"),
            (b"b\nc", b"B\nC"),
            (b"a", b"A"),
            (b"m\x04d", b"m\x04D"),
        ];
        let mut rec = recorder();
        for (m, t) in inputs {
            rec.record(&Lookup {
                handle: 0xdead,
                ..dcgettext(m, t)
            });
        }
        rec.into_writer()
    };
    assert_eq!(run(), run());
}

/// Full file: header, then stanzas separated by blank lines
#[test]
fn test_file_sink_end_to_end() -> anyhow::Result<()> {
    let temp = tempdir()?;
    let config = WatchConfig {
        output_dir: Some(temp.path().to_path_buf()),
        ..WatchConfig::default()
    };

    let mut sink = PoSink::create(&config, "demo", 31337)?;
    write_header(&mut sink, "Thu Oct 16 10:00:00 2026", "demo", 31337)?;
    let path = sink.path().to_path_buf();

    let mut rec = Recorder::new(sink, FixedStack::new(["main+0x1 [0x1]"]));
    rec.record(&dcgettext(b"Hello", b"Bonjour"));
    rec.record(&dcgettext(b"Bye", b"Salut"));
    rec.record(&dcgettext(b"Hello", b"Bonjour"));
    rec.writer_mut().flush()?;
    drop(rec);

    let text = std::fs::read_to_string(&path)?;
    assert!(text.starts_with("# wrap-gettext pseudo-po file\n# generated: "));
    assert_eq!(text.matches("\n\n#. [").count(), 2);
    assert_eq!(parse_stanzas(text.as_bytes()).len(), 2);
    assert!(text.ends_with("msgid \"Bye\"\nmsgstr \"Salut\"\n"));
    Ok(())
}

/// A second process with the same program name gets its own file
#[test]
fn test_second_sink_gets_pid_name() -> anyhow::Result<()> {
    let temp = tempdir()?;
    let config = WatchConfig {
        output_dir: Some(temp.path().to_path_buf()),
        ..WatchConfig::default()
    };

    let first = PoSink::create(&config, "demo", 1)?;
    let second = PoSink::create(&config, "demo", 2)?;
    assert_eq!(first.path(), temp.path().join("watch-gettext-demo.po"));
    assert_eq!(second.path(), temp.path().join("watch-gettext-demo-2.po"));
    Ok(())
}
