use roff::{bold, roman, Roff};
use std::fs;
use std::path::Path;

struct Example<'a> {
    title: &'a str,
    description: &'a str,
    code: &'a str,
}

struct ManPage<'a> {
    name: &'a str,
    about: &'a str,
    description: &'a str,
    synopsis: &'a str,
    options: &'a [(&'a str, &'a str)],
    environment: &'a [(&'a str, &'a str)],
    examples: &'a [Example<'a>],
    exit_status: &'a str,
    files: &'a str,
    see_also: &'a str,
    warnings: &'a str,
}

fn tagged_paragraphs(roff: &mut Roff, section: &str, items: &[(&str, &str)]) {
    if items.is_empty() {
        return;
    }
    roff.control("SH", [section]);
    for (tag, help) in items {
        roff.control("TP", [] as [&str; 0]);
        roff.text([bold(*tag)]);
        roff.text([roman(*help)]);
    }
}

fn render_man_page(page: &ManPage, out_dir: &Path) {
    let version = env!("CARGO_PKG_VERSION");
    let upper_name = page.name.to_uppercase();
    let date_version = format!("{} {}", page.name, version);
    let mut roff = Roff::default();
    roff.control("TH", [upper_name.as_str(), "1", date_version.as_str()]);
    roff.control("SH", ["NAME"]);
    roff.text([roman(format!("{} - {}", page.name, page.about))]);
    roff.control("SH", ["SYNOPSIS"]);
    roff.text([bold(page.name), roman(format!(" {}", page.synopsis))]);
    roff.control("SH", ["DESCRIPTION"]);
    for paragraph in page.description.split("\n\n") {
        roff.control("PP", [] as [&str; 0]);
        roff.text([roman(paragraph)]);
    }
    tagged_paragraphs(&mut roff, "OPTIONS", page.options);
    tagged_paragraphs(&mut roff, "ENVIRONMENT", page.environment);
    if !page.examples.is_empty() {
        roff.control("SH", ["EXAMPLES"]);
        for example in page.examples {
            roff.text([bold(example.title)]);
            roff.text([roman(example.description)]);
            roff.control("sp", [] as [&str; 0]);
            roff.control("nf", [] as [&str; 0]);
            roff.control("RS", ["4"]);
            for line in example.code.lines() {
                roff.text([roman(line)]);
            }
            roff.control("RE", [] as [&str; 0]);
            roff.control("fi", [] as [&str; 0]);
        }
    }
    if !page.exit_status.is_empty() {
        roff.control("SH", ["EXIT STATUS"]);
        roff.text([roman(page.exit_status)]);
    }
    if !page.files.is_empty() {
        roff.control("SH", ["FILES"]);
        for line in page.files.lines() {
            if let Some((path, desc)) = line.split_once('\t') {
                roff.control("TP", [] as [&str; 0]);
                roff.text([roman(path)]);
                roff.text([roman(desc)]);
            } else {
                roff.text([roman(line)]);
            }
        }
    }
    if !page.warnings.is_empty() {
        roff.control("SH", ["WARNINGS"]);
        roff.text([roman(page.warnings)]);
    }
    if !page.see_also.is_empty() {
        roff.control("SH", ["SEE ALSO"]);
        roff.text([roman(page.see_also)]);
    }
    fs::write(out_dir.join(format!("{}.1", page.name)), roff.to_roff()).unwrap();
}

fn main() {
    let out_dir = Path::new("target/man");
    fs::create_dir_all(out_dir).unwrap();

    render_man_page(
        &ManPage {
            name: "exec-wait",
            about: "wait for exec'd processes to start and finish",
            description: "Count the processes that share the caller's user namespace, wait \
                          for that count to change, and then wait for it to fall back to its \
                          starting value or below. Run as the entry point of a container, \
                          exec-wait keeps the container alive until work started in it with \
                          an exec command has finished.\n\n\
                          Processes are counted by comparing the target of \
                          /proc/pid/ns/user with that of /proc/self/ns/user. The process \
                          table is rescanned on every sample; processes that exit during a \
                          scan are not counted.",
            synopsis: "[-d]",
            options: &[
                (
                    "-d",
                    "Print diagnostics, including the starting process count and each \
                     waiting sample, to standard output.",
                ),
                ("-h, --help", "Print help."),
                ("-V, --version", "Print version."),
            ],
            environment: &[
                (
                    "EXEC_WAIT_INTERVAL_MS",
                    "Milliseconds to sleep between samples. The default is 100.",
                ),
                (
                    "EXEC_WAIT_START_POLICY",
                    "any-change (the default) treats any change in the process count as \
                     the start of new work, including a decrease. increase requires the \
                     count to rise above its starting value.",
                ),
                (
                    "EXEC_WAIT_PROC_ROOT",
                    "Where procfs is mounted. The default is /proc.",
                ),
                (
                    "RUST_LOG",
                    "Overrides the diagnostic log level.",
                ),
            ],
            examples: &[Example {
                title: "Example 1",
                description: "Keep a container running until a command exec'd into it \
                              has exited:",
                code: "\
$ podman run -d --name job image /usr/bin/exec-wait
$ podman exec job make check
$ podman wait job",
            }],
            exit_status: "0 when the additional processes have finished. 2 for an invalid \
                          option or environment setting.",
            files: "/proc/pid/ns/user\tUser namespace of each process.",
            see_also: "pwait(1), podman-exec(1), user_namespaces(7), proc(5)",
            warnings: "If the user namespace of exec-wait itself cannot be read, it counts \
                       the processes whose namespace cannot be read either. exec-wait has \
                       no timeout; if no additional process ever starts it waits forever.",
        },
        out_dir,
    );

    println!("cargo:rerun-if-changed=build.rs");
}
