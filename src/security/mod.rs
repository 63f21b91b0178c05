pub mod validator;

pub use validator::{SafetyValidator, SafetyVerdict, ValidatedCommand, ValidationError};

/// Base commands the executor is willing to run
///
/// Matching is exact on the first shell word. This is a vocabulary filter,
/// not a statement about what the arguments do: `rm` is listed, so anything
/// built on `rm` passes unless it is an exact entry in [`DANGEROUS_COMMANDS`].
pub const SAFE_COMMANDS: &[&str] = &[
    // File and directory operations
    "ls", "pwd", "cd", "echo", "cat", "grep", "find", "mkdir", "rm", "cp", "mv", "chmod",
    "chown", "test", "file", "stat", "touch", "ln", "tree", "basename", "dirname", "realpath",
    "readlink",
    // System information and monitoring
    "ps", "top", "htop", "df", "du", "free", "netstat", "ping", "traceroute", "dig",
    "nslookup", "ifconfig", "ip", "route", "systemctl", "service", "journalctl", "dmesg",
    "lsof", "fuser", "uptime", "uname", "hostname", "whoami", "who", "w", "last", "vmstat",
    "iostat", "sar", "mpstat", "pidstat", "smartctl", "sensors", "lshw", "lspci", "lsusb",
    "lsblk", "fdisk", "parted", "mount", "umount",
    // Process management
    "kill", "killall", "pkill", "nice", "renice", "nohup", "screen", "tmux", "bg", "fg",
    "jobs", "wait", "time", "timeout", "watch", "crontab",
    // Text processing
    "vim", "nano", "less", "more", "head", "tail", "sort", "uniq", "wc", "cut", "paste", "tr",
    "sed", "awk", "xargs", "tee", "split", "join", "comm", "diff", "patch", "jq", "yq", "xxd",
    "strings", "base64", "md5sum", "sha256sum",
    // Development tools
    "make", "gcc", "g++", "clang", "python3", "pip3", "nodejs", "npm", "yarn", "go", "rustc",
    "cargo", "java", "javac", "mvn", "gradle", "ruby", "gem", "perl", "php", "composer",
    "dotnet", "swift", "cmake", "ninja", "bazel", "meson", "autoconf", "automake",
    "pkg-config", "gdb", "lldb", "strace", "valgrind", "perf", "objdump", "nm", "ar",
    // Containers and orchestration
    "docker", "docker-compose", "kubectl", "helm", "terraform", "aws", "gcloud", "az",
    "vagrant", "podman", "buildah", "skopeo", "k9s", "minikube", "kind", "k3s", "rancher",
    "istioctl", "argocd",
    // Version control
    "git", "svn", "hg", "fossil",
    // Network tools
    "curl", "wget", "ssh", "scp", "rsync", "nc", "telnet", "socat", "nmap", "tcpdump",
    "wireshark", "iptables", "ufw", "firewall-cmd", "openssl", "ssh-keygen", "sftp", "ftp",
    "whois", "host", "mtr", "ss", "ethtool",
    // Package management
    "apt", "apt-get", "dpkg", "yum", "dnf", "rpm", "pacman", "brew", "port", "snap", "flatpak",
    // Compression and archiving
    "zip", "unzip", "gzip", "gunzip", "bzip2", "bunzip2", "xz", "7z", "rar", "tar", "cpio",
    // File system tools
    "fsck", "tune2fs", "resize2fs", "xfs_repair", "btrfs", "zfs", "zpool", "lvdisplay",
    "vgdisplay", "pvdisplay", "blkid", "findmnt", "diskutil",
    // System maintenance
    "sync", "updatedb", "logrotate", "chroot", "ldconfig", "locale-gen", "update-alternatives",
    // User management
    "passwd", "chage", "groups", "id", "newgrp", "sudo", "su", "usermod", "groupmod", "chsh",
    // Documentation
    "man", "info", "help", "whatis", "apropos",
    // Miscellaneous
    "date", "cal", "bc", "expr", "seq", "yes", "logger", "wall", "script", "expect", "at",
    "column", "fmt", "fold", "nl", "od", "pr", "rev", "shuf", "tsort", "unexpand", "units",
];

/// Flags accepted after `test`; no other base command gets per-flag checks
pub const SAFE_TEST_FLAGS: &[&str] = &[
    // File tests
    "-x", "-r", "-w", "-f", "-d", "-L", "-e",
    // Permission bits
    "-u", "-g", "-k", "-s",
    // Common options
    "-l", "-h", "-v", "-i", "-n", "-z", "-a", "-R", "--help", "--version", "--all",
    "--recursive", "--verbose", "--quiet", "--silent", "--force",
    // Listing
    "-1", "-C", "-F", "-H", "-S", "-t", "-X",
    // Sorting
    "-b", "-c", "-M",
    // Display
    "-p", "-q", "--color", "--no-color",
    // Time
    "-T", "--time", "--date",
    // Size
    "--size", "--block-size",
    // Format
    "-o", "-O", "--format", "--output",
    // Filters
    "-E", "-P", "-m", "--include", "--exclude",
    // VCS
    "--staged", "--cached", "--merged", "--no-merged",
    // Network
    "-4", "-6", "--ipv4", "--ipv6", "--wait",
];

/// Exact command strings that are always refused, even when the base command
/// is on the allowlist. Compared against the untokenized input.
pub const DANGEROUS_COMMANDS: &[&str] = &[
    "rm -rf /",
    "mkfs",
    "dd",
    ":(){:|:&};:",
    ":(){ :|:& };:",
    "chmod -R 777 /",
    "sudo rm -rf /",
    "sudo mkfs",
    "sudo dd",
    "sudo chmod -R 777 /",
];
